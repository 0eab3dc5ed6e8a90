mod change_notifier;
mod http_error;
mod http_routes;
mod venue_service;
mod ws_handler;

pub use change_notifier::*;
pub use http_error::*;
pub use http_routes::*;
pub use venue_service::*;
pub use ws_handler::*;
