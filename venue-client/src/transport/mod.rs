mod http_transport;
mod venue_transport;

pub use http_transport::*;
pub use venue_transport::*;
