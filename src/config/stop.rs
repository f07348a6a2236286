// ABOUTME: Container graceful shutdown configuration.
// ABOUTME: Defines how long a stop waits before the runtime kills the container.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopConfig {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for StopConfig {
    fn default() -> Self {
        StopConfig {
            timeout: default_timeout(),
        }
    }
}
