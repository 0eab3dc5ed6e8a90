pub mod config;
pub mod feed;
pub mod presence;
pub mod queue;
pub mod registry;
pub mod signaling;
pub mod store;

pub use config::*;
pub use feed::*;
pub use presence::*;
pub use queue::*;
pub use registry::*;
pub use signaling::*;
pub use store::*;
