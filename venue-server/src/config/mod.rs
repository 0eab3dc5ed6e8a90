mod venue_config;

pub use venue_config::*;
