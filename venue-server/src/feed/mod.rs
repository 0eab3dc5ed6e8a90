mod feed_arbitrator;

pub use feed_arbitrator::*;
