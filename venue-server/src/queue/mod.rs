mod signal_queue;

pub use signal_queue::*;
