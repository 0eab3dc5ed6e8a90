use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the venue server, without a trailing slash.
    pub url: String,
    pub auth_token: String,
    /// Minimum spacing between two exchange calls.
    #[serde(with = "millis")]
    pub throttle_window: Duration,
    /// Exchange at least this often even when nothing happens.
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    /// Upper bound of the retry delay after failed calls.
    #[serde(with = "millis")]
    pub max_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_owned(),
            auth_token: String::new(),
            throttle_window: Duration::from_millis(200),
            poll_interval: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Delay before the next attempt after `failures` consecutive failures.
    pub fn backoff(&self, failures: u32) -> Duration {
        let factor = 1u32 << failures.min(16);
        self.throttle_window
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
