//! Statistics and metrics for broadcasts and connections

use std::time::Duration;

use serde::Serialize;

use crate::registry::dispatch::SendOutcome;

/// Summary of a single broadcast call
///
/// Purely informational: a broadcast never fails as a whole, individual
/// targets do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Handles in the snapshot
    pub targeted: usize,
    /// Sends that completed successfully
    pub delivered: usize,
    /// Sends that returned an error
    pub failed: usize,
    /// Sends that hit the per-target deadline
    pub timed_out: usize,
    /// Sends abandoned because the caller cancelled
    pub cancelled: usize,
}

impl BroadcastReport {
    /// Create an empty report for `targeted` handles
    pub fn new(targeted: usize) -> Self {
        Self {
            targeted,
            ..Self::default()
        }
    }

    /// Count one settled send
    pub(crate) fn record(&mut self, outcome: &SendOutcome) {
        match outcome {
            SendOutcome::Delivered => self.delivered += 1,
            SendOutcome::Failed(_) => self.failed += 1,
            SendOutcome::TimedOut => self.timed_out += 1,
            SendOutcome::Cancelled => self.cancelled += 1,
        }
    }

    /// Number of sends that have settled in any way
    pub fn settled(&self) -> usize {
        self.delivered + self.failed + self.timed_out + self.cancelled
    }

    /// Whether every targeted handle accepted the payload
    pub fn all_delivered(&self) -> bool {
        self.delivered == self.targeted
    }
}

/// Membership of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    /// Group name
    pub name: String,
    /// Number of registered handles
    pub members: usize,
    /// Time since the group was created
    #[serde(serialize_with = "serialize_secs")]
    pub age: Duration,
}

/// Point-in-time view of the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Total registered handles across all groups
    pub connections: usize,
    /// Number of non-empty groups
    pub groups: usize,
    /// Per-group breakdown, sorted by name
    pub per_group: Vec<GroupStats>,
}

/// Server-wide statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerStats {
    /// WebSocket upgrades completed since start
    pub total_connections: u64,
    /// Currently registered connections
    pub active_connections: usize,
    /// Currently non-empty groups
    pub active_groups: usize,
    /// Current counter value
    pub counter: i64,
    /// Uptime
    #[serde(serialize_with = "serialize_secs")]
    pub uptime: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}
