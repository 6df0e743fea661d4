//! Dispatch configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dispatcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Deadline for one gateway call; 0 disables it
    pub call_timeout_seconds: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            call_timeout_seconds: 60,
        }
    }
}

impl DispatchConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        match self.call_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
