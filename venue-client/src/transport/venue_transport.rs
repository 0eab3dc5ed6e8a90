use crate::error::ClientError;
use async_trait::async_trait;
use venue_core::{
    ExchangeRequest, ExchangeResponse, JoinRequest, JoinResponse, OkResponse, PeerId,
    PublishFeedRequest, SettingsUpdate, VolumeLevels,
};

/// The venue RPC surface as seen from a client.
#[async_trait]
pub trait VenueTransport: Send + Sync {
    async fn join(&self, req: JoinRequest) -> Result<JoinResponse, ClientError>;

    async fn exchange(
        &self,
        peer_id: PeerId,
        req: ExchangeRequest,
    ) -> Result<ExchangeResponse, ClientError>;

    async fn publish_feed(
        &self,
        peer_id: PeerId,
        req: PublishFeedRequest,
    ) -> Result<OkResponse, ClientError>;

    async fn update_settings(
        &self,
        peer_id: PeerId,
        update: SettingsUpdate,
    ) -> Result<OkResponse, ClientError>;

    async fn raise_hand(&self, peer_id: PeerId, raised: bool) -> Result<OkResponse, ClientError>;

    async fn send_volume(
        &self,
        peer_id: PeerId,
        volume: VolumeLevels,
    ) -> Result<OkResponse, ClientError>;

    async fn leave(&self, peer_id: PeerId) -> Result<OkResponse, ClientError>;
}
