use thiserror::Error;
use venue_core::{ErrorBody, ErrorCode};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server rejected the call ({code:?}): {message}")]
    Rejected { code: ErrorCode, message: String },

    #[error("media error: {0}")]
    Media(String),
}

impl ClientError {
    /// The peer or room no longer exists on the server; re-join to continue.
    pub fn is_gone(&self) -> bool {
        matches!(
            self,
            ClientError::Rejected {
                code: ErrorCode::UnknownPeer | ErrorCode::UnknownRoom,
                ..
            }
        )
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ErrorBody> for ClientError {
    fn from(body: ErrorBody) -> Self {
        ClientError::Rejected {
            code: body.error,
            message: body.message,
        }
    }
}
