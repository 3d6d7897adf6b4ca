//! Connection registry implementation
//!
//! The central registry that tracks group membership of live connections and
//! fans payloads out to them.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::config::RegistryConfig;
use super::dispatch::{Dispatcher, Target};
use super::entry::GroupEntry;
use super::handle::ConnectionHandle;
use crate::stats::{BroadcastReport, GroupStats, RegistryStats};

/// Central registry for all live connections, keyed by group name
///
/// Thread-safe via `RwLock`. Mutations take the write lock; broadcasts take
/// the read lock only long enough to copy their targets out.
pub struct ConnectionRegistry<H> {
    /// Map of group name to its members
    groups: RwLock<HashMap<String, GroupEntry<H>>>,

    /// Fan-out with per-target deadline
    dispatcher: Dispatcher,

    /// Configuration
    config: RegistryConfig,
}

impl<H: ConnectionHandle> ConnectionRegistry<H> {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            dispatcher: Dispatcher::new(config.send_timeout),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a handle under a group
    ///
    /// The group is created if it doesn't exist. Adding the same handle to the
    /// same group twice is the caller's mistake and is not checked.
    pub async fn add(&self, group: &str, handle: Arc<H>) {
        let mut groups = self.groups.write().await;

        let entry = groups
            .entry(group.to_owned())
            .or_insert_with(|| GroupEntry::new(group));
        entry.push(handle);

        tracing::debug!(group = %group, members = entry.len(), "Connection added");
    }

    /// Unregister a handle from a group
    ///
    /// Does nothing if the group or the handle isn't registered. The group is
    /// dropped once its last member leaves. Returns whether a handle was
    /// removed.
    pub async fn remove(&self, group: &str, handle: &Arc<H>) -> bool {
        let mut groups = self.groups.write().await;

        let Some(entry) = groups.get_mut(group) else {
            return false;
        };

        if !entry.remove(handle) {
            return false;
        }

        let remaining = entry.len();
        if entry.is_empty() {
            groups.remove(group);
            tracing::debug!(group = %group, "Last connection removed, group dropped");
        } else {
            tracing::debug!(group = %group, members = remaining, "Connection removed");
        }

        true
    }

    /// Send a payload to every registered handle in every group
    ///
    /// Waits until every send has completed, failed or timed out.
    pub async fn broadcast_all(
        &self,
        cancel: &CancellationToken,
        payload: impl Into<Bytes>,
    ) -> BroadcastReport {
        let targets = {
            let groups = self.groups.read().await;
            groups
                .values()
                .flat_map(|entry| entry.targets())
                .collect::<Vec<Target<H>>>()
        };

        self.dispatcher
            .dispatch(cancel, targets, payload.into())
            .await
    }

    /// Send a payload to every handle in one group
    ///
    /// Returns immediately with an empty report if the group doesn't exist.
    pub async fn broadcast_to_group(
        &self,
        cancel: &CancellationToken,
        group: &str,
        payload: impl Into<Bytes>,
    ) -> BroadcastReport {
        let targets = {
            let groups = self.groups.read().await;
            match groups.get(group) {
                Some(entry) => entry.targets().collect::<Vec<Target<H>>>(),
                None => return BroadcastReport::default(),
            }
        };

        self.dispatcher
            .dispatch(cancel, targets, payload.into())
            .await
    }

    /// Get total number of registered handles across all groups
    pub async fn connection_count(&self) -> usize {
        self.groups.read().await.values().map(GroupEntry::len).sum()
    }

    /// Get number of non-empty groups
    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }

    /// Get number of handles in a group, or 0 if it doesn't exist
    pub async fn members_in_group(&self, group: &str) -> usize {
        self.groups
            .read()
            .await
            .get(group)
            .map_or(0, GroupEntry::len)
    }

    /// Check if a group exists
    pub async fn has_group(&self, group: &str) -> bool {
        self.groups.read().await.contains_key(group)
    }

    /// Get the names of all groups, sorted
    pub async fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get registry statistics
    pub async fn stats(&self) -> RegistryStats {
        let groups = self.groups.read().await;

        let mut per_group: Vec<GroupStats> = groups
            .values()
            .map(|entry| GroupStats {
                name: entry.name().to_owned(),
                members: entry.len(),
                age: entry.created_at.elapsed(),
            })
            .collect();
        per_group.sort_by(|a, b| a.name.cmp(&b.name));

        RegistryStats {
            connections: per_group.iter().map(|g| g.members).sum(),
            groups: per_group.len(),
            per_group,
        }
    }
}

impl<H: ConnectionHandle> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
