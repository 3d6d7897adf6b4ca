//! Group entry type
//!
//! This module defines the per-group membership list stored in the registry.

use std::sync::Arc;
use std::time::Instant;

use super::dispatch::Target;

/// Membership of a single named group
///
/// Members are kept in join order. An entry never stays in the registry once
/// its member list is empty.
pub struct GroupEntry<H> {
    /// Group name, shared with every snapshot target
    name: Arc<str>,

    /// Registered handles in join order
    members: Vec<Arc<H>>,

    /// When the group was created
    pub created_at: Instant,
}

impl<H> GroupEntry<H> {
    /// Create an empty group entry
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            members: Vec::new(),
            created_at: Instant::now(),
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members left
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Registered members in join order
    pub fn members(&self) -> &[Arc<H>] {
        &self.members
    }

    /// Append a member
    pub(super) fn push(&mut self, handle: Arc<H>) {
        self.members.push(handle);
    }

    /// Remove the first member that is the same allocation as `handle`
    ///
    /// Returns `true` if a member was removed.
    pub(super) fn remove(&mut self, handle: &Arc<H>) -> bool {
        match self.members.iter().position(|m| Arc::ptr_eq(m, handle)) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy the members out as broadcast targets tagged with this group
    pub(super) fn targets(&self) -> impl Iterator<Item = Target<H>> + '_ {
        self.members.iter().map(|handle| Target {
            group: Arc::clone(&self.name),
            handle: Arc::clone(handle),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_by_identity() {
        let mut entry = GroupEntry::new("lobby");
        let a = Arc::new(1u8);
        let b = Arc::new(1u8);
        entry.push(Arc::clone(&a));
        entry.push(Arc::clone(&b));

        // Equal value, different allocation: only `b` goes
        assert!(entry.remove(&b));
        assert_eq!(entry.len(), 1);
        assert!(Arc::ptr_eq(&entry.members()[0], &a));

        assert!(!entry.remove(&b));
        assert!(entry.remove(&a));
        assert!(entry.is_empty());
    }

    #[test]
    fn test_targets_carry_group_name() {
        let mut entry = GroupEntry::new("lobby");
        entry.push(Arc::new(()));
        entry.push(Arc::new(()));

        let targets: Vec<_> = entry.targets().collect();
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| &*t.group == "lobby"));
        assert!(Arc::ptr_eq(&targets[0].handle, &entry.members()[0]));
    }
}
