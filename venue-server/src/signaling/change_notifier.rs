use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use venue_core::RoomId;

/// Implemented by whatever pushes "something changed" hints to clients so
/// they exchange right away instead of waiting for their next poll.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn room_changed(&self, room_id: RoomId);
}

/// One broadcast channel per room. Receivers that lag simply miss hints,
/// which is harmless since the next exchange picks everything up.
pub struct BroadcastNotifier {
    rooms: DashMap<RoomId, broadcast::Sender<RoomId>>,
    capacity: usize,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity,
        }
    }

    pub fn subscribe(&self, room_id: RoomId) -> broadcast::Receiver<RoomId> {
        self.rooms
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeNotifier for BroadcastNotifier {
    async fn room_changed(&self, room_id: RoomId) {
        let Some(tx) = self.rooms.get(&room_id).map(|tx| tx.clone()) else {
            return;
        };
        if tx.send(room_id).is_err() {
            // Last subscriber went away.
            self.rooms.remove_if(&room_id, |_, tx| tx.receiver_count() == 0);
            debug!("No listeners left for room {}", room_id);
        }
    }
}

/// Notifier for hosts that rely on polling alone.
pub struct NoopNotifier;

#[async_trait]
impl ChangeNotifier for NoopNotifier {
    async fn room_changed(&self, _room_id: RoomId) {}
}
