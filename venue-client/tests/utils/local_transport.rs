use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use venue_client::{ClientConfig, ClientError, MediaFactory, VenueClient, VenueTransport};
use venue_core::{
    Capabilities, ErrorBody, ErrorCode, ExchangeRequest, ExchangeResponse, JoinRequest,
    JoinResponse, OkResponse, PeerId, PublishFeedRequest, Room, RoomId, SessionContext,
    SettingsUpdate, UserId, VenueError, VolumeLevels,
};
use venue_server::{MemoryStore, NoopNotifier, VenueConfig, VenueService};

fn rejected(e: VenueError) -> ClientError {
    ErrorBody::from(&e).into()
}

/// Calls a `VenueService` in-process on behalf of one session.
pub struct LocalTransport {
    service: VenueService,
    ctx: SessionContext,
    failures: AtomicUsize,
}

impl LocalTransport {
    pub fn new(service: VenueService, ctx: SessionContext) -> Self {
        Self {
            service,
            ctx,
            failures: AtomicUsize::new(0),
        }
    }

    /// Makes the next `n` exchange calls fail with a storage error.
    pub fn fail_exchanges(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl VenueTransport for LocalTransport {
    async fn join(&self, req: JoinRequest) -> Result<JoinResponse, ClientError> {
        self.service.join(&self.ctx, req).await.map_err(rejected)
    }

    async fn exchange(
        &self,
        peer_id: PeerId,
        req: ExchangeRequest,
    ) -> Result<ExchangeResponse, ClientError> {
        if self.take_failure() {
            return Err(ClientError::Rejected {
                code: ErrorCode::Storage,
                message: "injected failure".into(),
            });
        }
        self.service
            .exchange(&self.ctx, peer_id, req)
            .await
            .map_err(rejected)
    }

    async fn publish_feed(
        &self,
        peer_id: PeerId,
        req: PublishFeedRequest,
    ) -> Result<OkResponse, ClientError> {
        self.service
            .publish_feed(&self.ctx, peer_id, req)
            .await
            .map_err(rejected)
    }

    async fn update_settings(
        &self,
        peer_id: PeerId,
        update: SettingsUpdate,
    ) -> Result<OkResponse, ClientError> {
        self.service
            .update_settings(&self.ctx, peer_id, update)
            .await
            .map_err(rejected)
    }

    async fn raise_hand(&self, peer_id: PeerId, raised: bool) -> Result<OkResponse, ClientError> {
        self.service
            .raise_hand(&self.ctx, peer_id, raised)
            .await
            .map_err(rejected)
    }

    async fn send_volume(
        &self,
        peer_id: PeerId,
        volume: VolumeLevels,
    ) -> Result<OkResponse, ClientError> {
        self.service
            .send_volume(&self.ctx, peer_id, volume)
            .await
            .map_err(rejected)
    }

    async fn leave(&self, peer_id: PeerId) -> Result<OkResponse, ClientError> {
        self.service.leave(&self.ctx, peer_id).await.map_err(rejected)
    }
}

pub const ROOM: RoomId = RoomId(1);

/// A venue with one open room.
pub async fn test_service() -> VenueService {
    let service = VenueService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(NoopNotifier),
        &VenueConfig::default(),
    );
    service.open_room(Room::venue(ROOM)).await.unwrap();
    service
}

pub struct TestClient {
    pub client: VenueClient,
    pub events: tokio::sync::mpsc::UnboundedReceiver<venue_client::ClientEvent>,
    pub transport: Arc<LocalTransport>,
}

pub async fn join_client(
    service: &VenueService,
    user: u64,
    media: Arc<dyn MediaFactory>,
) -> TestClient {
    let ctx = SessionContext::new(UserId(user), Capabilities::participant());
    let transport = Arc::new(LocalTransport::new(service.clone(), ctx));
    let (client, events) = VenueClient::join(
        transport.clone(),
        media,
        ClientConfig::default(),
        JoinRequest::new(ROOM),
    )
    .await
    .unwrap();

    TestClient {
        client,
        events,
        transport,
    }
}

impl TestClient {
    pub fn drain_events(&mut self) -> Vec<venue_client::ClientEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}
