//! Request and response bodies of the venue RPC surface.

use crate::model::control::VolumeLevels;
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use crate::model::settings::PeerSettings;
use crate::model::signaling::{IceServerConfig, SignalEnvelope, SignalId, SignalKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinCapability {
    Publisher,
    #[default]
    Subscriber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub room_id: RoomId,
    /// Existing peer of this session to re-attach to.
    #[serde(default)]
    pub peer_id: Option<PeerId>,
    #[serde(default)]
    pub capability: JoinCapability,
    /// Initial feed key for publishers.
    #[serde(default)]
    pub feed: Option<String>,
}

impl JoinRequest {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            peer_id: None,
            capability: JoinCapability::Subscriber,
            feed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub peer_id: PeerId,
    pub room_id: RoomId,
    /// True when an existing peer was re-used.
    pub attached: bool,
    /// True when this peer holds the room's feed after joining.
    pub feed: bool,
    pub ice_servers: Vec<IceServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingSignal {
    #[serde(rename = "to")]
    pub to_peer: PeerId,
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    #[serde(default)]
    pub messages: Vec<OutgoingSignal>,
    /// Highest signal id already consumed.
    #[serde(default)]
    pub lastsignal: SignalId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub messages: Vec<SignalEnvelope>,
    pub peers: Vec<PeerId>,
    pub settings: Vec<PeerSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishFeedRequest {
    pub publish: bool,
    #[serde(default)]
    pub feed: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub mute: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
}

impl SettingsUpdate {
    pub fn mute(mute: bool) -> Self {
        Self {
            mute: Some(mute),
            closed: None,
        }
    }

    pub fn close() -> Self {
        Self {
            mute: None,
            closed: Some(true),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mute.is_none() && self.closed.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseHandRequest {
    pub raised: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeRequest {
    pub volume: VolumeLevels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub const OK: OkResponse = OkResponse { ok: true };
    pub const REJECTED: OkResponse = OkResponse { ok: false };
}
