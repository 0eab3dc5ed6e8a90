use crate::engine::{ClientEvent, VenueClient};
use tracing::{debug, info, warn};
use venue_core::{ControlMessage, SignalEnvelope, SignalKind};

impl VenueClient {
    pub(super) async fn handle_signal(&mut self, envelope: SignalEnvelope) {
        let from = envelope.frompeer;

        if let SignalKind::Control(name) = &envelope.kind {
            match ControlMessage::from_payload(&envelope.message) {
                Some(ControlMessage::RaiseHand(raised)) => {
                    info!("Peer {} raised hand: {}", from, raised);
                    self.emit(ClientEvent::HandRaised { peer: from, raised });
                }
                Some(ControlMessage::Volume(levels)) => {
                    self.emit(ClientEvent::Volume {
                        peer: from,
                        levels: levels.clamped(),
                    });
                }
                None => debug!("Unhandled {} signal from {}", name, from),
            }
            return;
        }

        // Only an offer opens a connection; anything else for an unknown
        // remote is a leftover from a link already torn down.
        if envelope.kind != SignalKind::Offer && !self.connections.contains_key(&from) {
            debug!("Dropping {} from {} without a connection", envelope.kind, from);
            return;
        }

        let conn = self.open_connection(from);
        let before = conn.state();
        let outcome = conn.on_signal(&envelope.kind, &envelope.message).await;
        if let Err(e) = &outcome {
            warn!("Negotiation with {} failed: {}", from, e);
            conn.close();
        }
        let after = conn.state();

        if let Ok(Some(reply)) = outcome {
            self.outbox.push(reply);
        }
        if after != before {
            self.emit(ClientEvent::ConnectionChanged {
                peer: from,
                state: after,
            });
        }
    }
}
