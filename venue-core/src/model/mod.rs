mod control;
mod peer;
mod room;
mod rpc;
mod settings;
mod signaling;
mod task;

pub use control::{ControlMessage, VolumeLevels};
pub use peer::{Owner, Peer, PeerId, SessionId, UserId};
pub use room::{RelayCoordinates, Room, RoomId};
pub use rpc::{
    ExchangeRequest, ExchangeResponse, JoinCapability, JoinRequest, JoinResponse, OkResponse,
    OutgoingSignal, PublishFeedRequest, RaiseHandRequest, SettingsUpdate, VolumeRequest,
};
pub use settings::PeerSettings;
pub use signaling::{IceServerConfig, Signal, SignalEnvelope, SignalId, SignalKind};
pub use task::TaskKind;
