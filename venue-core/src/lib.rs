pub mod context;
pub mod error;
pub mod model;

pub use context::{Capabilities, SessionContext};
pub use error::{ErrorBody, ErrorCode, VenueError, VenueResult};
pub use model::*;
