use async_trait::async_trait;
use venue_core::{Owner, Peer, PeerId, Room, RoomId, Signal, SignalId, SignalKind, VenueResult};

/// Fields of a peer row to create.
#[derive(Debug, Clone)]
pub struct NewPeer {
    pub room_id: RoomId,
    pub owner: Owner,
}

/// Partial update of a peer row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct PeerUpdate {
    pub mute: Option<bool>,
    pub closed: Option<bool>,
    pub feed_key: Option<String>,
}

impl PeerUpdate {
    pub fn feed_key(key: impl Into<String>) -> Self {
        Self {
            feed_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn clear_feed() -> Self {
        Self::feed_key(String::new())
    }
}

/// Shared datastore behind every core operation.
///
/// Each method is atomic on its own row; no method spans a transaction.
/// Implementations must be safe to call from unrelated concurrent requests.
#[async_trait]
pub trait VenueStore: Send + Sync {
    async fn put_room(&self, room: Room) -> VenueResult<()>;

    async fn get_room(&self, room_id: RoomId) -> VenueResult<Option<Room>>;

    async fn list_rooms(&self) -> VenueResult<Vec<Room>>;

    /// Moves the room's feed pointer from `expected` to `new`. Returns false
    /// when the pointer no longer equals `expected`.
    async fn swap_published_feed(
        &self,
        room_id: RoomId,
        expected: Option<PeerId>,
        new: Option<PeerId>,
    ) -> VenueResult<bool>;

    async fn insert_peer(&self, peer: NewPeer) -> VenueResult<Peer>;

    async fn get_peer(&self, peer_id: PeerId) -> VenueResult<Option<Peer>>;

    /// Applies the update and bumps `updated_at`. `None` if the peer is gone.
    async fn update_peer(&self, peer_id: PeerId, update: PeerUpdate) -> VenueResult<Option<Peer>>;

    async fn delete_peer(&self, peer_id: PeerId) -> VenueResult<Option<Peer>>;

    async fn peers_in_room(&self, room_id: RoomId) -> VenueResult<Vec<Peer>>;

    /// Appends a signal with the next monotonic id. Fails with `UnknownPeer`
    /// when either end no longer exists.
    async fn insert_signal(
        &self,
        from_peer: PeerId,
        to_peer: PeerId,
        kind: SignalKind,
        payload: String,
    ) -> VenueResult<SignalId>;

    /// Deletes signals addressed to `to_peer` with `id <= checkpoint`.
    async fn delete_signals_through(&self, to_peer: PeerId, checkpoint: SignalId)
    -> VenueResult<usize>;

    /// Signals addressed to `to_peer`, ascending by id.
    async fn signals_for(&self, to_peer: PeerId) -> VenueResult<Vec<Signal>>;

    /// Deletes every signal to or from `peer_id`.
    async fn delete_signals_of(&self, peer_id: PeerId) -> VenueResult<usize>;
}
