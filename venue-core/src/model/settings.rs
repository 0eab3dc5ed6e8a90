use crate::model::peer::{Peer, PeerId};
use serde::{Deserialize, Serialize};

/// Per-peer state clients reconcile their UI and connections against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSettings {
    pub id: PeerId,
    pub mute: bool,
    pub closed: bool,
    /// Set while the peer is the room's published feed.
    #[serde(default)]
    pub feed: bool,
}

impl From<&Peer> for PeerSettings {
    fn from(peer: &Peer) -> Self {
        Self {
            id: peer.id,
            mute: peer.mute,
            closed: peer.closed,
            feed: peer.holds_feed(),
        }
    }
}
