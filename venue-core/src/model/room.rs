use crate::model::peer::PeerId;
use crate::model::task::TaskKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One venue task. Peers in the same room can signal each other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl From<u64> for RoomId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coordinates of the room on the external media relay. Owned by the relay
/// integration and only read by the signaling core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayCoordinates {
    pub server: String,
    pub room: String,
    #[serde(default, skip_serializing)]
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub kind: TaskKind,
    /// Participant limit; `None` falls back to the configured default.
    #[serde(default)]
    pub peer_limit: Option<u32>,
    #[serde(default)]
    pub relay: Option<RelayCoordinates>,
    #[serde(default)]
    pub published_feed: Option<PeerId>,
}

impl Room {
    pub fn venue(id: RoomId) -> Self {
        Self {
            id,
            kind: TaskKind::Venue,
            peer_limit: None,
            relay: None,
            published_feed: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.peer_limit = Some(limit);
        self
    }

    pub fn with_relay(mut self, relay: RelayCoordinates) -> Self {
        self.relay = Some(relay);
        self
    }
}
