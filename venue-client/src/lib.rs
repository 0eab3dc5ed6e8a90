mod config;
mod engine;
mod error;
mod peer_connection;
mod transport;

pub use config::ClientConfig;
pub use engine::{ClientCommand, ClientEvent, ClientHandle, Throttle, VenueClient};
pub use error::ClientError;
pub use peer_connection::{ConnectionState, MediaFactory, MediaSession, PeerConnection};
pub use transport::{HttpTransport, VenueTransport};
