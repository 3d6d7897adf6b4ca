//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::registry::RegistryConfig;

/// Group used when a client doesn't ask for one
pub const DEFAULT_GROUP: &str = "counter";

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Group for clients that don't pass `?group=`
    pub default_group: String,

    /// Counter increment interval
    pub tick_interval: Duration,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Registry configuration
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8910)),
            default_group: DEFAULT_GROUP.to_owned(),
            tick_interval: Duration::from_secs(1),
            max_connections: 0, // Unlimited
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the default group
    pub fn default_group(mut self, group: impl Into<String>) -> Self {
        self.default_group = group.into();
        self
    }

    /// Set the counter tick interval
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the per-target broadcast deadline
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.registry = self.registry.send_timeout(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 8910);
        assert_eq!(config.default_group, "counter");
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.registry.send_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "0.0.0.0:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.default_group, DEFAULT_GROUP);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .default_group("lobby")
            .tick_interval(Duration::from_millis(200))
            .max_connections(10)
            .send_timeout(Duration::from_secs(2));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.default_group, "lobby");
        assert_eq!(config.tick_interval, Duration::from_millis(200));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.registry.send_timeout, Duration::from_secs(2));
    }
}
