use crate::model::peer::PeerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Monotonic signal id. Doubles as the delivery checkpoint.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Default, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
#[serde(transparent)]
pub struct SignalId(pub u64);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signal type. The payload is opaque to the server whatever the kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    Control(String),
}

impl SignalKind {
    pub const CONTROL: &'static str = "control";

    pub fn control() -> Self {
        SignalKind::Control(Self::CONTROL.to_owned())
    }

    pub fn as_str(&self) -> &str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
            SignalKind::Control(name) => name,
        }
    }

    pub fn is_negotiation(&self) -> bool {
        !matches!(self, SignalKind::Control(_))
    }
}

impl From<String> for SignalKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "offer" => SignalKind::Offer,
            "answer" => SignalKind::Answer,
            "ice-candidate" => SignalKind::IceCandidate,
            _ => SignalKind::Control(s),
        }
    }
}

impl From<&str> for SignalKind {
    fn from(s: &str) -> Self {
        SignalKind::from(s.to_owned())
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Control(name) => name,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued message between two peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub from_peer: PeerId,
    pub to_peer: PeerId,
    pub kind: SignalKind,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// Wire shape of a delivered signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEnvelope {
    pub id: SignalId,
    pub frompeer: PeerId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: SignalKind,
}

impl From<Signal> for SignalEnvelope {
    fn from(signal: Signal) -> Self {
        Self {
            id: signal.id,
            frompeer: signal.from_peer,
            message: signal.payload,
            kind: signal.kind,
        }
    }
}
