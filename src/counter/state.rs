//! Counter state
//!
//! The single owner of the counter value. Mutations return the value they
//! produced so the broadcast that follows carries exactly that value.

use tokio::sync::RwLock;

/// Lock-guarded counter shared by the ticker and every connection
#[derive(Debug, Default)]
pub struct CounterState {
    value: RwLock<i64>,
}

impl CounterState {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value
    pub async fn get(&self) -> i64 {
        *self.value.read().await
    }

    /// Add one and return the new value
    pub async fn increment(&self) -> i64 {
        let mut value = self.value.write().await;
        *value = value.wrapping_add(1);
        *value
    }

    /// Set to zero and return the new value
    pub async fn reset(&self) -> i64 {
        let mut value = self.value.write().await;
        *value = 0;
        *value
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_increment_and_reset() {
        let counter = CounterState::new();
        assert_eq!(counter.get().await, 0);

        assert_eq!(counter.increment().await, 1);
        assert_eq!(counter.increment().await, 2);
        assert_eq!(counter.get().await, 2);

        assert_eq!(counter.reset().await, 0);
        assert_eq!(counter.get().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments() {
        let counter = Arc::new(CounterState::new());

        let tasks: Vec<_> = (0..100)
            .map(|_| {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move { counter.increment().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(counter.get().await, 100);
    }

    #[test]
    fn test_increment_wraps() {
        let counter = CounterState {
            value: RwLock::new(i64::MAX),
        };
        assert_eq!(tokio_test::block_on(counter.increment()), i64::MIN);
    }
}
