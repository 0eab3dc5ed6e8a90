use std::time::Duration;
use tokio::time::Instant;

/// Rate limiter for exchange calls. Requests inside the window collapse
/// into one deferred call at the window's end.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last_fire: Option<Instant>,
    deferred: Option<Instant>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fire: None,
            deferred: None,
        }
    }

    /// Asks for a call and returns when it may happen. A call already
    /// scheduled absorbs the request.
    pub fn request(&mut self, now: Instant) -> Instant {
        if let Some(at) = self.deferred {
            return at;
        }
        let at = match self.last_fire {
            Some(last) if now < last + self.window => last + self.window,
            _ => now,
        };
        self.deferred = Some(at);
        at
    }

    /// Records that the scheduled call is being made.
    pub fn fire(&mut self, now: Instant) {
        self.last_fire = Some(now);
        self.deferred = None;
    }

    /// Pushes the next call out by `delay`, replacing whatever was scheduled.
    pub fn backoff(&mut self, now: Instant, delay: Duration) {
        self.deferred = Some(now + delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deferred
    }

    pub fn is_pending(&self) -> bool {
        self.deferred.is_some()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
