use crate::model::{Owner, SessionId, UserId};
use serde::{Deserialize, Serialize};

/// What the host's permission framework allows the caller to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub join: bool,
    /// Bypasses the participant limit and may preempt the feed.
    pub moderate: bool,
}

impl Capabilities {
    pub fn participant() -> Self {
        Self {
            join: true,
            moderate: false,
        }
    }

    pub fn moderator() -> Self {
        Self {
            join: true,
            moderate: true,
        }
    }
}

/// Identity of the caller of a core operation. Passed explicitly instead of
/// being read from ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub owner: Owner,
    pub capabilities: Capabilities,
}

impl SessionContext {
    pub fn new(user_id: UserId, capabilities: Capabilities) -> Self {
        Self {
            owner: Owner {
                user_id,
                session_id: SessionId::new(),
            },
            capabilities,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.owner.session_id
    }

    pub fn is_moderator(&self) -> bool {
        self.capabilities.moderate
    }

    pub fn owns(&self, owner: &Owner) -> bool {
        self.owner.session_id == owner.session_id
    }
}
