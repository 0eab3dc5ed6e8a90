pub mod local_transport;

pub use local_transport::*;
pub use recording_media::*;
