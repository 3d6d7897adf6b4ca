//! Registry configuration

use std::time::Duration;

/// Default per-target send deadline
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the connection registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Deadline applied independently to every send of a broadcast
    pub send_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl RegistryConfig {
    /// Set the per-target send deadline
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }
}
