use crate::feed::FeedArbitrator;
use crate::signaling::ChangeNotifier;
use crate::store::{NewPeer, PeerUpdate, VenueStore};
use std::sync::Arc;
use tracing::{debug, info};
use venue_core::{
    Peer, PeerId, PeerSettings, Room, RoomId, SessionContext, SettingsUpdate, VenueError,
    VenueResult,
};

/// Loads a peer and checks that the caller's session owns it.
pub(crate) async fn load_owned_peer(
    store: &dyn VenueStore,
    ctx: &SessionContext,
    peer_id: PeerId,
) -> VenueResult<Peer> {
    let peer = store
        .get_peer(peer_id)
        .await?
        .ok_or(VenueError::UnknownPeer(peer_id))?;

    if !ctx.owns(&peer.owner) {
        return Err(VenueError::Unauthorized);
    }
    Ok(peer)
}

/// One row per connected peer per room.
#[derive(Clone)]
pub struct PeerRegistry {
    store: Arc<dyn VenueStore>,
    feeds: FeedArbitrator,
    notifier: Arc<dyn ChangeNotifier>,
    default_limit: Option<u32>,
}

impl PeerRegistry {
    pub fn new(
        store: Arc<dyn VenueStore>,
        feeds: FeedArbitrator,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            store,
            feeds,
            notifier,
            default_limit: None,
        }
    }

    /// Limit applied to rooms that carry none of their own.
    pub fn with_default_limit(mut self, limit: Option<u32>) -> Self {
        self.default_limit = limit;
        self
    }

    pub async fn register(&self, ctx: &SessionContext, room_id: RoomId) -> VenueResult<PeerId> {
        if !ctx.capabilities.join {
            return Err(VenueError::Unauthorized);
        }
        let room = self.venue_room(room_id).await?;
        let live = self.live_peers(room_id).await?;

        if let Some(limit) = room.peer_limit.or(self.default_limit) {
            if live.len() >= limit as usize && !ctx.is_moderator() {
                debug!("Room {} full ({} of {})", room_id, live.len(), limit);
                return Err(VenueError::CapacityExceeded);
            }
        }

        let first_for_owner = !live
            .iter()
            .any(|p| p.owner.user_id == ctx.owner.user_id);

        let peer = self
            .store
            .insert_peer(NewPeer {
                room_id,
                owner: ctx.owner,
            })
            .await?;
        info!("Peer {} registered in room {}", peer.id, room_id);

        if first_for_owner {
            self.notifier.room_changed(room_id).await;
        }
        Ok(peer.id)
    }

    /// Re-uses a live peer the caller's session already has in the room.
    pub async fn attach(
        &self,
        ctx: &SessionContext,
        room_id: RoomId,
        peer_id: PeerId,
    ) -> VenueResult<Peer> {
        let peer = load_owned_peer(self.store.as_ref(), ctx, peer_id).await?;
        if peer.room_id != room_id || peer.closed {
            return Err(VenueError::UnknownPeer(peer_id));
        }
        debug!("Peer {} re-attached in room {}", peer_id, room_id);
        Ok(peer)
    }

    /// Partial update by the owning session. Closing also gives up the feed.
    pub async fn update_settings(
        &self,
        ctx: &SessionContext,
        peer_id: PeerId,
        update: SettingsUpdate,
    ) -> VenueResult<()> {
        let peer = load_owned_peer(self.store.as_ref(), ctx, peer_id).await?;
        if update.is_empty() {
            return Ok(());
        }

        if update.closed == Some(true) {
            self.feeds.release(peer_id).await?;
        }

        self.store
            .update_peer(
                peer_id,
                PeerUpdate {
                    mute: update.mute,
                    closed: update.closed,
                    feed_key: None,
                },
            )
            .await?
            .ok_or(VenueError::UnknownPeer(peer_id))?;

        if update.closed == Some(true) {
            info!("Peer {} closed", peer_id);
        }
        self.notifier.room_changed(peer.room_id).await;
        Ok(())
    }

    /// Settings of every peer in the caller's room, closed ones included.
    /// The feed flag follows the room's feed pointer.
    pub async fn get_settings(&self, peer_id: PeerId) -> VenueResult<Vec<PeerSettings>> {
        let peer = self
            .store
            .get_peer(peer_id)
            .await?
            .ok_or(VenueError::UnknownPeer(peer_id))?;
        let published = self
            .store
            .get_room(peer.room_id)
            .await?
            .and_then(|room| room.published_feed);

        Ok(self
            .store
            .peers_in_room(peer.room_id)
            .await?
            .iter()
            .map(|p| PeerSettings {
                feed: published == Some(p.id) && p.is_live(),
                ..PeerSettings::from(p)
            })
            .collect())
    }

    /// Hard delete. Drops the feed and every signal to or from the peer.
    ///
    /// The row goes before its signals: once it is gone the store refuses
    /// new signals to or from the peer, so the purge leaves nothing behind.
    pub async fn remove(&self, peer_id: PeerId) -> VenueResult<Option<Peer>> {
        self.feeds.release(peer_id).await?;

        let Some(peer) = self.store.delete_peer(peer_id).await? else {
            self.store.delete_signals_of(peer_id).await?;
            return Ok(None);
        };
        let purged = self.store.delete_signals_of(peer_id).await?;
        info!(
            "Peer {} removed from room {} ({} signals purged)",
            peer_id, peer.room_id, purged
        );
        self.notifier.room_changed(peer.room_id).await;
        Ok(Some(peer))
    }

    pub async fn live_peers(&self, room_id: RoomId) -> VenueResult<Vec<Peer>> {
        Ok(self
            .store
            .peers_in_room(room_id)
            .await?
            .into_iter()
            .filter(Peer::is_live)
            .collect())
    }

    async fn venue_room(&self, room_id: RoomId) -> VenueResult<Room> {
        match self.store.get_room(room_id).await? {
            Some(room) if room.kind.is_venue() => Ok(room),
            _ => Err(VenueError::UnknownRoom(room_id)),
        }
    }
}
