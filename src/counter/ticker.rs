//! Periodic counter increment

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::message::CounterMessage;
use super::state::CounterState;
use crate::registry::{ConnectionHandle, ConnectionRegistry};
use crate::stats::BroadcastReport;

/// Broadcast the given counter value to every registered connection
///
/// Returns `None` if the message could not be encoded.
pub async fn publish<H: ConnectionHandle>(
    registry: &ConnectionRegistry<H>,
    cancel: &CancellationToken,
    value: i64,
) -> Option<BroadcastReport> {
    match CounterMessage::update(value).to_payload() {
        Ok(payload) => Some(registry.broadcast_all(cancel, payload).await),
        Err(e) => {
            tracing::error!(error = %e, "Failed to marshal counter message");
            None
        }
    }
}

/// Spawn the ticker task
///
/// Every `interval` the counter is incremented and the new value is published
/// from a separate task, so a slow broadcast never delays the next tick. The
/// task stops when `shutdown` is cancelled; in-flight broadcasts are cancelled
/// with it.
pub fn spawn_ticker<H: ConnectionHandle>(
    counter: Arc<CounterState>,
    registry: Arc<ConnectionRegistry<H>>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // `interval` panics on a zero period
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let value = counter.increment().await;
            let registry = Arc::clone(&registry);
            let cancel = shutdown.clone();
            tokio::spawn(async move {
                publish(&registry, &cancel, value).await;
            });
        }

        tracing::debug!("Counter ticker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryConfig;
    use crate::test_helpers::{Behavior, MockHandle};

    fn decode(payload: &[u8]) -> CounterMessage {
        serde_json::from_slice(payload).unwrap()
    }

    #[tokio::test]
    async fn test_publish_encodes_update() {
        let registry = ConnectionRegistry::new();
        let h = MockHandle::new(Behavior::Accept);
        registry.add("counter", Arc::clone(&h)).await;

        let report = publish(&registry, &CancellationToken::new(), 9).await.unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(decode(&h.received()[0]), CounterMessage::update(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_increments_and_broadcasts() {
        let counter = Arc::new(CounterState::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let h = MockHandle::new(Behavior::Accept);
        registry.add("counter", Arc::clone(&h)).await;
        let shutdown = CancellationToken::new();

        let task = spawn_ticker(
            Arc::clone(&counter),
            Arc::clone(&registry),
            Duration::from_secs(1),
            shutdown.clone(),
        );

        tokio::time::sleep(Duration::from_millis(3500)).await;
        shutdown.cancel();
        task.await.unwrap();

        assert_eq!(counter.get().await, 3);
        let mut values: Vec<i64> = h.received().iter().map(|p| decode(p).counter).collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_broadcast_does_not_delay_ticks() {
        let counter = Arc::new(CounterState::new());
        let registry = Arc::new(ConnectionRegistry::with_config(
            RegistryConfig::default().send_timeout(Duration::from_secs(5)),
        ));
        registry.add("counter", MockHandle::new(Behavior::Hang)).await;
        let shutdown = CancellationToken::new();

        let task = spawn_ticker(
            Arc::clone(&counter),
            Arc::clone(&registry),
            Duration::from_secs(1),
            shutdown.clone(),
        );

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(counter.get().await, 3);

        shutdown.cancel();
        task.await.unwrap();
    }
}
