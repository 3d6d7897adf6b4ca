//! Statistics for broadcasts, the registry and the server

pub mod metrics;

pub use metrics::{BroadcastReport, GroupStats, RegistryStats, ServerStats};
