mod memory_store;
mod venue_store;

pub use memory_store::*;
pub use venue_store::*;
