use async_trait::async_trait;
use venue_core::{Room, VenueResult};

/// The external media server that carries the actual audio and video.
#[async_trait]
pub trait MediaRelay: Send + Sync {
    /// Identities of everyone the relay currently sees in the room. An empty
    /// list means the relay has nothing useful to say.
    async fn participants(&self, room: &Room) -> VenueResult<Vec<String>>;
}

/// For deployments without a relay.
pub struct NoRelay;

#[async_trait]
impl MediaRelay for NoRelay {
    async fn participants(&self, _room: &Room) -> VenueResult<Vec<String>> {
        Ok(Vec::new())
    }
}
