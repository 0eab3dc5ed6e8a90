mod peer_registry;

pub use peer_registry::*;
