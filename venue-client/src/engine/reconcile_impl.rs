use crate::engine::{ClientEvent, VenueClient};
use crate::peer_connection::ConnectionState;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use venue_core::{PeerId, PeerSettings};

impl VenueClient {
    /// Aligns local state with the server's room snapshot: publishes
    /// settings and feed changes, closes links to peers that left or closed
    /// and offers to live peers with a lower id.
    pub(super) async fn reconcile(&mut self, peers: Vec<PeerId>, settings: Vec<PeerSettings>) {
        let snapshot: HashMap<PeerId, PeerSettings> =
            settings.into_iter().map(|s| (s.id, s)).collect();

        let feed_before = feed_holder(&self.settings);
        let feed_after = feed_holder(&snapshot);
        if snapshot != self.settings {
            let mut sorted: Vec<PeerSettings> = snapshot.values().cloned().collect();
            sorted.sort_by_key(|s| s.id);
            self.settings = snapshot;
            self.emit(ClientEvent::SettingsChanged(sorted));
        }
        if feed_before != feed_after {
            info!("Room {} feed is now {:?}", self.room_id, feed_after);
            self.emit(ClientEvent::FeedChanged(feed_after));
        }

        let live: HashSet<PeerId> = peers.into_iter().filter(|p| *p != self.peer_id).collect();

        let departed: Vec<PeerId> = self
            .connections
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for peer in departed {
            if let Some(mut conn) = self.connections.remove(&peer) {
                conn.close();
                self.emit(ClientEvent::ConnectionChanged {
                    peer,
                    state: ConnectionState::Closed,
                });
            }
        }

        // The newer peer (higher id) offers, so each pair negotiates once.
        let mut to_offer: Vec<PeerId> = live
            .into_iter()
            .filter(|p| *p < self.peer_id && !self.connections.contains_key(p))
            .collect();
        to_offer.sort();
        for peer in to_offer {
            let conn = self.open_connection(peer);
            match conn.start().await {
                Ok(Some(offer)) => {
                    self.outbox.push(offer);
                    self.emit(ClientEvent::ConnectionChanged {
                        peer,
                        state: ConnectionState::Negotiating,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not offer to peer {}: {}", peer, e);
                    if let Some(mut conn) = self.connections.remove(&peer) {
                        conn.close();
                    }
                }
            }
        }
    }
}

fn feed_holder(settings: &HashMap<PeerId, PeerSettings>) -> Option<PeerId> {
    settings
        .values()
        .find(|s| s.feed && !s.closed)
        .map(|s| s.id)
}
