use crate::registry::load_owned_peer;
use crate::signaling::ChangeNotifier;
use crate::store::{PeerUpdate, VenueStore};
use std::sync::Arc;
use tracing::{debug, info, warn};
use venue_core::{Peer, PeerId, RoomId, SessionContext, VenueError, VenueResult};

/// Bounded retries for losing a compare-and-set on the feed pointer.
const MAX_SWAP_ATTEMPTS: usize = 4;

/// Keeps at most one published video feed per room.
///
/// The room row's `published_feed` pointer is the source of truth and only
/// ever moves by compare-and-set; the holder's `feed_key` mirrors it.
#[derive(Clone)]
pub struct FeedArbitrator {
    store: Arc<dyn VenueStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl FeedArbitrator {
    pub fn new(store: Arc<dyn VenueStore>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Makes `peer_id` the room's feed. Ordinary peers get `FeedBusy` while
    /// another live peer holds it; moderators preempt.
    pub async fn publish(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        feed_key: Option<String>,
    ) -> VenueResult<()> {
        let peer = load_owned_peer(self.store.as_ref(), ctx, peer_id).await?;
        if peer.closed {
            return Err(VenueError::UnknownPeer(peer_id));
        }
        let key = feed_key
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| peer.id.to_string());

        for _ in 0..MAX_SWAP_ATTEMPTS {
            let room = self
                .store
                .get_room(peer.room_id)
                .await?
                .ok_or(VenueError::UnknownRoom(peer.room_id))?;

            match room.published_feed {
                None => {
                    if self.swap(room.id, None, Some(peer_id)).await? {
                        return self.install(&peer, key, None).await;
                    }
                }
                Some(holder) if holder == peer_id => {
                    return self.mirror_key(&peer, key).await;
                }
                Some(holder) => {
                    let holder_live = self
                        .store
                        .get_peer(holder)
                        .await?
                        .is_some_and(|p| p.is_live());

                    if holder_live && !ctx.is_moderator() {
                        debug!("Peer {} denied feed in room {}: held by {}", peer_id, room.id, holder);
                        return Err(VenueError::FeedBusy(room.id));
                    }
                    if self.swap(room.id, Some(holder), Some(peer_id)).await? {
                        return self.install(&peer, key, Some(holder)).await;
                    }
                }
            }
        }

        warn!("Gave up publishing feed for {} after contention", peer_id);
        Err(VenueError::FeedBusy(peer.room_id))
    }

    /// Withdraws the caller's feed. Succeeds as a no-op when it holds none.
    pub async fn unpublish(&self, ctx: &SessionContext, peer_id: PeerId) -> VenueResult<()> {
        load_owned_peer(self.store.as_ref(), ctx, peer_id).await?;
        self.release(peer_id).await?;
        Ok(())
    }

    /// Unpublishes without an authorization check. Returns whether the peer
    /// was the room's feed.
    pub async fn release(&self, peer_id: PeerId) -> VenueResult<bool> {
        let Some(peer) = self.store.get_peer(peer_id).await? else {
            return Ok(false);
        };

        let released = match self.store.get_room(peer.room_id).await? {
            Some(room) if room.published_feed == Some(peer_id) => {
                self.swap(room.id, Some(peer_id), None).await?
            }
            _ => false,
        };

        if peer.holds_feed() {
            self.store
                .update_peer(peer_id, PeerUpdate::clear_feed())
                .await?;
        }

        if released {
            info!("Feed released by {} in room {}", peer_id, peer.room_id);
            self.notifier.room_changed(peer.room_id).await;
        }
        Ok(released)
    }

    pub async fn current_feed(&self, room_id: RoomId) -> VenueResult<Option<PeerId>> {
        let room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or(VenueError::UnknownRoom(room_id))?;
        Ok(room.published_feed)
    }

    async fn swap(
        &self,
        room_id: RoomId,
        expected: Option<PeerId>,
        new: Option<PeerId>,
    ) -> VenueResult<bool> {
        self.store.swap_published_feed(room_id, expected, new).await
    }

    /// Mirrors a won pointer swap onto the peer rows. The previous holder is
    /// cleared first.
    async fn install(&self, peer: &Peer, key: String, previous: Option<PeerId>) -> VenueResult<()> {
        if let Some(previous) = previous {
            self.store
                .update_peer(previous, PeerUpdate::clear_feed())
                .await?;
            info!(
                "Feed in room {} preempted: {} -> {}",
                peer.room_id, previous, peer.id
            );
        }

        self.mirror_key(peer, key).await?;
        info!("Peer {} publishes the feed in room {}", peer.id, peer.room_id);
        self.notifier.room_changed(peer.room_id).await;
        Ok(())
    }

    /// Writes the holder's key, then confirms the pointer still names it. A
    /// preemption that raced the write wins and the key is taken back, so
    /// only the pointer's holder is left carrying one.
    async fn mirror_key(&self, peer: &Peer, key: String) -> VenueResult<()> {
        if self
            .store
            .update_peer(peer.id, PeerUpdate::feed_key(key))
            .await?
            .is_none()
        {
            // Evicted between the swap and now; give the pointer back.
            self.swap(peer.room_id, Some(peer.id), None).await?;
            return Err(VenueError::UnknownPeer(peer.id));
        }

        if self.current_feed(peer.room_id).await? != Some(peer.id) {
            self.store
                .update_peer(peer.id, PeerUpdate::clear_feed())
                .await?;
            debug!("Peer {} lost the feed in room {} while publishing", peer.id, peer.room_id);
            return Err(VenueError::FeedBusy(peer.room_id));
        }
        Ok(())
    }
}
