use crate::store::{NewPeer, PeerUpdate, VenueStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use venue_core::{
    Peer, PeerId, Room, RoomId, Signal, SignalId, SignalKind, VenueError, VenueResult,
};

/// In-process store on `DashMap`. Every row operation holds only the shard
/// lock of the row it touches.
pub struct MemoryStore {
    rooms: DashMap<RoomId, Room>,
    peers: DashMap<PeerId, Peer>,
    /// Recipient -> pending signals keyed by id.
    mailboxes: DashMap<PeerId, BTreeMap<SignalId, Signal>>,
    next_peer: AtomicU64,
    next_signal: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            peers: DashMap::new(),
            mailboxes: DashMap::new(),
            next_peer: AtomicU64::new(1),
            next_signal: AtomicU64::new(1),
        }
    }

    pub fn pending_signal_count(&self) -> usize {
        self.mailboxes.iter().map(|mb| mb.value().len()).sum()
    }

    /// Recipients with a mailbox entry, empty or not.
    pub fn mailbox_count(&self) -> usize {
        self.mailboxes.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VenueStore for MemoryStore {
    async fn put_room(&self, room: Room) -> VenueResult<()> {
        self.rooms.insert(room.id, room);
        Ok(())
    }

    async fn get_room(&self, room_id: RoomId) -> VenueResult<Option<Room>> {
        Ok(self.rooms.get(&room_id).map(|r| r.value().clone()))
    }

    async fn list_rooms(&self) -> VenueResult<Vec<Room>> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|r| r.value().clone()).collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }

    async fn swap_published_feed(
        &self,
        room_id: RoomId,
        expected: Option<PeerId>,
        new: Option<PeerId>,
    ) -> VenueResult<bool> {
        let mut room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(VenueError::UnknownRoom(room_id))?;

        if room.published_feed != expected {
            return Ok(false);
        }
        room.published_feed = new;
        Ok(true)
    }

    async fn insert_peer(&self, new: NewPeer) -> VenueResult<Peer> {
        let id = PeerId(self.next_peer.fetch_add(1, Ordering::SeqCst));
        let now = Utc::now();
        let peer = Peer {
            id,
            room_id: new.room_id,
            owner: new.owner,
            mute: false,
            closed: false,
            feed_key: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.peers.insert(id, peer.clone());
        Ok(peer)
    }

    async fn get_peer(&self, peer_id: PeerId) -> VenueResult<Option<Peer>> {
        Ok(self.peers.get(&peer_id).map(|p| p.value().clone()))
    }

    async fn update_peer(&self, peer_id: PeerId, update: PeerUpdate) -> VenueResult<Option<Peer>> {
        let Some(mut peer) = self.peers.get_mut(&peer_id) else {
            return Ok(None);
        };

        if let Some(mute) = update.mute {
            peer.mute = mute;
        }
        if let Some(closed) = update.closed {
            peer.closed = closed;
        }
        if let Some(feed_key) = update.feed_key {
            peer.feed_key = feed_key;
        }
        peer.updated_at = Utc::now();

        Ok(Some(peer.clone()))
    }

    async fn delete_peer(&self, peer_id: PeerId) -> VenueResult<Option<Peer>> {
        Ok(self.peers.remove(&peer_id).map(|(_, peer)| peer))
    }

    async fn peers_in_room(&self, room_id: RoomId) -> VenueResult<Vec<Peer>> {
        let mut peers: Vec<Peer> = self
            .peers
            .iter()
            .filter(|p| p.room_id == room_id)
            .map(|p| p.value().clone())
            .collect();
        peers.sort_by_key(|p| p.id);
        Ok(peers)
    }

    async fn insert_signal(
        &self,
        from_peer: PeerId,
        to_peer: PeerId,
        kind: SignalKind,
        payload: String,
    ) -> VenueResult<SignalId> {
        // The id is taken while holding the recipient's mailbox so a drain can
        // never observe id N+1 before id N lands in the same mailbox.
        let mut mailbox = self.mailboxes.entry(to_peer).or_default();

        // Checked under the mailbox lock: a removal deletes the peer row before
        // purging mailboxes, so a signal for a removed peer never lands.
        let missing = [to_peer, from_peer]
            .into_iter()
            .find(|id| !self.peers.contains_key(id));
        if let Some(missing) = missing {
            drop(mailbox);
            self.mailboxes.remove_if(&to_peer, |_, mb| mb.is_empty());
            return Err(VenueError::UnknownPeer(missing));
        }

        let id = SignalId(self.next_signal.fetch_add(1, Ordering::SeqCst));
        mailbox.insert(
            id,
            Signal {
                id,
                from_peer,
                to_peer,
                kind,
                payload,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn delete_signals_through(
        &self,
        to_peer: PeerId,
        checkpoint: SignalId,
    ) -> VenueResult<usize> {
        let Some(mut mailbox) = self.mailboxes.get_mut(&to_peer) else {
            return Ok(0);
        };
        let before = mailbox.len();
        let keep = mailbox.split_off(&SignalId(checkpoint.0.saturating_add(1)));
        *mailbox = keep;
        let acked = before - mailbox.len();
        drop(mailbox);

        self.mailboxes.remove_if(&to_peer, |_, mb| mb.is_empty());
        Ok(acked)
    }

    async fn signals_for(&self, to_peer: PeerId) -> VenueResult<Vec<Signal>> {
        Ok(self
            .mailboxes
            .get(&to_peer)
            .map(|mb| mb.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_signals_of(&self, peer_id: PeerId) -> VenueResult<usize> {
        let mut removed = self
            .mailboxes
            .remove(&peer_id)
            .map(|(_, mb)| mb.len())
            .unwrap_or(0);

        self.mailboxes.retain(|_, mailbox| {
            let before = mailbox.len();
            mailbox.retain(|_, s| s.from_peer != peer_id);
            removed += before - mailbox.len();
            !mailbox.is_empty()
        });

        Ok(removed)
    }
}
