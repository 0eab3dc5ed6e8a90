use crate::model::room::RoomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use uuid::Uuid;

/// Handle of one browser tab's venue session. Stable for the session's lifetime.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl From<u64> for PeerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for PeerId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// The host's transport session (a logged-in browser session), not a peer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a peer belongs to. Used for authorization, never for addressing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Owner {
    pub user_id: UserId,
    pub session_id: SessionId,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Peer {
    pub id: PeerId,
    pub room_id: RoomId,
    pub owner: Owner,
    pub mute: bool,
    /// Logically gone, but may still have undelivered signals.
    pub closed: bool,
    /// Non-empty only while this peer is the room's published feed.
    pub feed_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Peer {
    pub fn is_live(&self) -> bool {
        !self.closed
    }

    pub fn holds_feed(&self) -> bool {
        !self.feed_key.is_empty()
    }

    /// Name under which the media relay lists this peer.
    pub fn relay_identity(&self) -> String {
        if self.feed_key.is_empty() {
            self.id.to_string()
        } else {
            self.feed_key.clone()
        }
    }
}
