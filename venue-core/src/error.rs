use crate::model::{PeerId, RoomId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type VenueResult<T> = Result<T, VenueError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VenueError {
    #[error("caller lacks the capability for this action")]
    Unauthorized,

    #[error("room participant limit reached")]
    CapacityExceeded,

    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    #[error("unknown room {0}")]
    UnknownRoom(RoomId),

    #[error("room {0} already has a published feed")]
    FeedBusy(RoomId),

    #[error("media relay unavailable: {0}")]
    RelayUnavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Stable error identifier carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    CapacityExceeded,
    UnknownPeer,
    UnknownRoom,
    FeedBusy,
    RelayUnavailable,
    InvalidInput,
    Storage,
}

impl VenueError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VenueError::Unauthorized => ErrorCode::Unauthorized,
            VenueError::CapacityExceeded => ErrorCode::CapacityExceeded,
            VenueError::UnknownPeer(_) => ErrorCode::UnknownPeer,
            VenueError::UnknownRoom(_) => ErrorCode::UnknownRoom,
            VenueError::FeedBusy(_) => ErrorCode::FeedBusy,
            VenueError::RelayUnavailable(_) => ErrorCode::RelayUnavailable,
            VenueError::InvalidInput(_) => ErrorCode::InvalidInput,
            VenueError::Storage(_) => ErrorCode::Storage,
        }
    }

    /// Benign: the referenced peer or room is gone and the client should re-join.
    pub fn is_gone(&self) -> bool {
        matches!(self, VenueError::UnknownPeer(_) | VenueError::UnknownRoom(_))
    }
}

/// JSON body returned for a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: ErrorCode,
    pub message: String,
}

impl From<&VenueError> for ErrorBody {
    fn from(err: &VenueError) -> Self {
        Self {
            ok: false,
            error: err.code(),
            message: err.to_string(),
        }
    }
}
