pub use venue_core::{PeerId, RoomId, SessionContext, VenueError, VenueResult};

pub mod model {
    pub use venue_core::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use venue_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use venue_client::*;
}
