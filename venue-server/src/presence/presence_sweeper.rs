use crate::presence::{MediaRelay, SessionDirectory};
use crate::registry::PeerRegistry;
use crate::store::VenueStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use venue_core::{Peer, PeerId, Room, RoomId, VenueResult};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Venue rooms that had at least one peer.
    pub rooms: usize,
    pub relay_calls: usize,
    pub purged_signals: usize,
    pub evicted: Vec<PeerId>,
}

/// Reclaims peers whose browser went away without saying goodbye.
///
/// The only writer that deletes a peer without its cooperation.
pub struct PresenceSweeper {
    store: Arc<dyn VenueStore>,
    registry: PeerRegistry,
    sessions: Arc<dyn SessionDirectory>,
    relay: Arc<dyn MediaRelay>,
}

impl PresenceSweeper {
    pub fn new(
        store: Arc<dyn VenueStore>,
        registry: PeerRegistry,
        sessions: Arc<dyn SessionDirectory>,
        relay: Arc<dyn MediaRelay>,
    ) -> Self {
        Self {
            store,
            registry,
            sessions,
            relay,
        }
    }

    /// One reconciliation pass over every venue room.
    pub async fn sweep(&self) -> VenueResult<SweepReport> {
        let mut report = SweepReport::default();
        // Keyed by room id only; `None` means the relay gave no usable answer.
        let mut participants: HashMap<RoomId, Option<Vec<String>>> = HashMap::new();

        for room in self.store.list_rooms().await? {
            if !room.kind.is_venue() {
                continue;
            }
            let peers = self.store.peers_in_room(room.id).await?;
            if peers.is_empty() {
                continue;
            }
            report.rooms += 1;

            for peer in peers {
                if peer.closed {
                    self.evict(&peer, &mut report).await?;
                    continue;
                }
                if self.sessions.is_alive(peer.owner.session_id).await {
                    continue;
                }

                report.purged_signals += self.store.delete_signals_of(peer.id).await?;

                if !participants.contains_key(&room.id) {
                    let listed = self.fetch_participants(&room, &mut report).await;
                    participants.insert(room.id, listed);
                }
                let identity = peer.relay_identity();
                let still_listed = participants
                    .get(&room.id)
                    .and_then(Option::as_ref)
                    .is_some_and(|listed| listed.contains(&identity));

                if still_listed {
                    debug!(
                        "Peer {} orphaned but still on the relay as '{}'",
                        peer.id, identity
                    );
                    continue;
                }
                self.evict(&peer, &mut report).await?;
            }
        }

        Ok(report)
    }

    /// Runs `sweep` every `interval` until `shutdown` turns true or its
    /// sender is dropped.
    pub fn spawn(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Presence sweeper started ({:?} interval)", interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => match self.sweep().await {
                        Ok(report) if !report.evicted.is_empty() => {
                            info!(
                                "Sweep evicted {} peers across {} rooms",
                                report.evicted.len(),
                                report.rooms
                            );
                        }
                        Ok(_) => {}
                        Err(e) => error!("Sweep failed: {}", e),
                    },

                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Presence sweeper stopped");
        })
    }

    async fn fetch_participants(&self, room: &Room, report: &mut SweepReport) -> Option<Vec<String>> {
        room.relay.as_ref()?;
        report.relay_calls += 1;

        match self.relay.participants(room).await {
            Ok(listed) if listed.is_empty() => None,
            Ok(listed) => Some(listed),
            Err(e) => {
                warn!("Relay lookup for room {} failed: {}", room.id, e);
                None
            }
        }
    }

    async fn evict(&self, peer: &Peer, report: &mut SweepReport) -> VenueResult<()> {
        if self.registry.remove(peer.id).await?.is_some() {
            info!(
                "Evicted peer {} from room {} (closed: {})",
                peer.id, peer.room_id, peer.closed
            );
            report.evicted.push(peer.id);
        }
        Ok(())
    }
}
