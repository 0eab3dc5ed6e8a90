use crate::utils::{MockRelay, RecordingNotifier};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use venue_core::{
    Capabilities, ExchangeRequest, ExchangeResponse, JoinRequest, OutgoingSignal, PeerId,
    RelayCoordinates, Room, RoomId, SessionContext, SignalId, SignalKind, UserId,
};
use venue_server::{MemorySessions, MemoryStore, PresenceSweeper, VenueConfig, VenueService};

/// A venue service over in-memory collaborators, plus handles on each of
/// them for assertions.
pub struct TestVenue {
    pub service: VenueService,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<MemorySessions>,
    pub notifier: RecordingNotifier,
    pub relay: MockRelay,
    next_token: AtomicU64,
}

impl TestVenue {
    pub fn new() -> Self {
        Self::with_config(VenueConfig::default())
    }

    pub fn with_config(config: VenueConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::new();
        let service = VenueService::new(store.clone(), Arc::new(notifier.clone()), &config);

        Self {
            service,
            store,
            sessions: Arc::new(MemorySessions::new()),
            notifier,
            relay: MockRelay::new(),
            next_token: AtomicU64::new(1),
        }
    }

    pub async fn open_room(&self, id: u64, limit: Option<u32>) -> RoomId {
        let mut room = Room::venue(RoomId(id)).with_relay(RelayCoordinates {
            server: "https://relay.test/janus".into(),
            room: id.to_string(),
            secret: "secret".into(),
        });
        room.peer_limit = limit;
        self.service.open_room(room).await.expect("open room");
        RoomId(id)
    }

    pub fn sweeper(&self) -> PresenceSweeper {
        PresenceSweeper::new(
            self.store.clone(),
            self.service.registry().clone(),
            self.sessions.clone(),
            Arc::new(self.relay.clone()),
        )
    }

    /// Opens a live session for a user and returns its context.
    pub fn session(&self, user: u64, capabilities: Capabilities) -> SessionContext {
        let ctx = SessionContext::new(UserId(user), capabilities);
        let n = self.next_token.fetch_add(1, Ordering::SeqCst);
        self.sessions.open(format!("token-{}", n), ctx);
        ctx
    }

    pub fn participant(&self, user: u64) -> SessionContext {
        self.session(user, Capabilities::participant())
    }

    pub fn moderator(&self, user: u64) -> SessionContext {
        self.session(user, Capabilities::moderator())
    }

    pub async fn join(&self, ctx: &SessionContext, room_id: RoomId) -> PeerId {
        self.service
            .join(ctx, JoinRequest::new(room_id))
            .await
            .expect("join")
            .peer_id
    }

    /// Sends one signal through an exchange and discards the reply.
    pub async fn send(
        &self,
        ctx: &SessionContext,
        from: PeerId,
        to: PeerId,
        kind: SignalKind,
        payload: &str,
    ) {
        self.service
            .exchange(
                ctx,
                from,
                ExchangeRequest {
                    messages: vec![OutgoingSignal {
                        to_peer: to,
                        kind,
                        payload: payload.to_owned(),
                    }],
                    lastsignal: SignalId(0),
                },
            )
            .await
            .expect("exchange");
    }

    pub async fn poll(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        checkpoint: SignalId,
    ) -> ExchangeResponse {
        self.service
            .exchange(
                ctx,
                peer_id,
                ExchangeRequest {
                    messages: Vec::new(),
                    lastsignal: checkpoint,
                },
            )
            .await
            .expect("exchange")
    }

    /// Number of non-closed peers in the room carrying a feed key.
    pub async fn feed_holders(&self, room_id: RoomId) -> usize {
        use venue_server::VenueStore;

        self.store
            .peers_in_room(room_id)
            .await
            .unwrap()
            .iter()
            .filter(|p| p.is_live() && p.holds_feed())
            .count()
    }
}
