mod media_relay;
mod presence_sweeper;
mod session_directory;

pub use media_relay::*;
pub use presence_sweeper::*;
pub use session_directory::*;
