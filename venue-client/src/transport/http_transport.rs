use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::VenueTransport;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use venue_core::{
    ErrorBody, ExchangeRequest, ExchangeResponse, JoinRequest, JoinResponse, OkResponse, PeerId,
    PublishFeedRequest, RaiseHandRequest, SettingsUpdate, VolumeLevels, VolumeRequest,
};

/// `VenueTransport` over the server's JSON HTTP routes.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            auth_token: config.auth_token.clone(),
        }
    }

    async fn call<B, R>(&self, method: Method, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let response = self
            .client
            .request(method, url)
            .bearer_auth(&self.auth_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if status.is_success() {
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            debug!("{} rejected with {}", path, status);
            let body: ErrorBody = serde_json::from_slice(&bytes)?;
            Err(body.into())
        }
    }
}

#[async_trait]
impl VenueTransport for HttpTransport {
    async fn join(&self, req: JoinRequest) -> Result<JoinResponse, ClientError> {
        self.call(Method::POST, "/join", &req).await
    }

    async fn exchange(
        &self,
        peer_id: PeerId,
        req: ExchangeRequest,
    ) -> Result<ExchangeResponse, ClientError> {
        self.call(Method::POST, &format!("/peers/{peer_id}/exchange"), &req)
            .await
    }

    async fn publish_feed(
        &self,
        peer_id: PeerId,
        req: PublishFeedRequest,
    ) -> Result<OkResponse, ClientError> {
        self.call(Method::POST, &format!("/peers/{peer_id}/feed"), &req)
            .await
    }

    async fn update_settings(
        &self,
        peer_id: PeerId,
        update: SettingsUpdate,
    ) -> Result<OkResponse, ClientError> {
        self.call(Method::POST, &format!("/peers/{peer_id}/settings"), &update)
            .await
    }

    async fn raise_hand(&self, peer_id: PeerId, raised: bool) -> Result<OkResponse, ClientError> {
        self.call(
            Method::POST,
            &format!("/peers/{peer_id}/hand"),
            &RaiseHandRequest { raised },
        )
        .await
    }

    async fn send_volume(
        &self,
        peer_id: PeerId,
        volume: VolumeLevels,
    ) -> Result<OkResponse, ClientError> {
        self.call(
            Method::POST,
            &format!("/peers/{peer_id}/volume"),
            &VolumeRequest { volume },
        )
        .await
    }

    async fn leave(&self, peer_id: PeerId) -> Result<OkResponse, ClientError> {
        self.call(Method::DELETE, &format!("/peers/{peer_id}"), &()).await
    }
}
