use crate::store::VenueStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use venue_core::{PeerId, Signal, SignalId, SignalKind, VenueResult};

/// Ordered point-to-point mailbox between peers.
///
/// Delivery is cursor based: a recipient passes the highest id it has
/// consumed, everything up to it is deleted, and the rest is returned again
/// until acknowledged.
#[derive(Clone)]
pub struct SignalQueue {
    store: Arc<dyn VenueStore>,
}

impl SignalQueue {
    pub fn new(store: Arc<dyn VenueStore>) -> Self {
        Self { store }
    }

    /// Fails with `UnknownPeer` when the sender or the recipient is gone.
    pub async fn send(
        &self,
        from_peer: PeerId,
        to_peer: PeerId,
        kind: SignalKind,
        payload: String,
    ) -> VenueResult<SignalId> {
        let id = self
            .store
            .insert_signal(from_peer, to_peer, kind.clone(), payload)
            .await?;
        debug!("Queued {} {} -> {} as #{}", kind, from_peer, to_peer, id);
        Ok(id)
    }

    /// Acknowledges everything up to `checkpoint`, then returns what is still
    /// queued for `peer_id` from senders that are still live.
    pub async fn drain(&self, peer_id: PeerId, checkpoint: SignalId) -> VenueResult<Vec<Signal>> {
        let acked = self.store.delete_signals_through(peer_id, checkpoint).await?;
        if acked > 0 {
            debug!("Peer {} acknowledged {} signals up to #{}", peer_id, acked, checkpoint);
        }

        let pending = self.store.signals_for(peer_id).await?;
        let mut sender_live: HashMap<PeerId, bool> = HashMap::new();
        let mut out = Vec::with_capacity(pending.len());

        for signal in pending {
            let live = match sender_live.get(&signal.from_peer) {
                Some(live) => *live,
                None => {
                    let live = self
                        .store
                        .get_peer(signal.from_peer)
                        .await?
                        .is_some_and(|p| p.is_live());
                    sender_live.insert(signal.from_peer, live);
                    live
                }
            };
            if live {
                out.push(signal);
            }
        }

        Ok(out)
    }
}
