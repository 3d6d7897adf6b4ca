//! Concurrent broadcast dispatch
//!
//! Delivers one payload to a snapshot of targets. Every target gets its own
//! task and its own deadline, so a peer that hangs costs at most one
//! `send_timeout` and never delays its siblings.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::handle::{ConnectionHandle, SendError};
use crate::stats::BroadcastReport;

/// One handle to deliver to, tagged with the group it was snapshotted from
pub struct Target<H> {
    /// Group the handle belongs to (used for logging)
    pub group: Arc<str>,
    /// Handle to send to
    pub handle: Arc<H>,
}

impl<H> Clone for Target<H> {
    fn clone(&self) -> Self {
        Self {
            group: Arc::clone(&self.group),
            handle: Arc::clone(&self.handle),
        }
    }
}

/// Result of a single targeted send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The handle accepted the payload
    Delivered,
    /// The handle returned an error
    Failed(SendError),
    /// The send did not finish within the per-target deadline
    TimedOut,
    /// The caller's cancellation token fired first
    Cancelled,
}

/// Fans a payload out to many handles with per-target timeout isolation
#[derive(Debug, Clone)]
pub struct Dispatcher {
    send_timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with the given per-target deadline
    pub fn new(send_timeout: Duration) -> Self {
        Self { send_timeout }
    }

    /// Per-target deadline
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Send `payload` to every target and wait for all of them to settle
    ///
    /// Failures are logged with the target's group and counted in the report;
    /// they never abort other sends and never surface as an error. Cancelling
    /// `cancel` ends every send still in flight. Dropping the returned future
    /// aborts the spawned sends as well.
    pub async fn dispatch<H: ConnectionHandle>(
        &self,
        cancel: &CancellationToken,
        targets: Vec<Target<H>>,
        payload: Bytes,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::new(targets.len());
        if targets.is_empty() {
            return report;
        }

        let mut sends = JoinSet::new();
        for target in targets {
            let cancel = cancel.clone();
            let payload = payload.clone();
            let send_timeout = self.send_timeout;

            sends.spawn(async move {
                let outcome = send_one(&*target.handle, payload, send_timeout, &cancel).await;
                (target.group, outcome)
            });
        }

        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok((group, outcome)) => {
                    self.log_outcome(&group, &outcome);
                    report.record(&outcome);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Broadcast send task failed");
                    report.record(&SendOutcome::Failed(SendError::Transport(e.to_string())));
                }
            }
        }

        tracing::debug!(
            targeted = report.targeted,
            delivered = report.delivered,
            failed = report.failed,
            timed_out = report.timed_out,
            cancelled = report.cancelled,
            "Broadcast dispatched"
        );

        report
    }

    fn log_outcome(&self, group: &str, outcome: &SendOutcome) {
        match outcome {
            SendOutcome::Delivered => {}
            SendOutcome::Failed(e) => {
                // The owning read loop will notice the dead link and deregister
                tracing::warn!(group = %group, error = %e, "Error broadcasting to client");
            }
            SendOutcome::TimedOut => {
                tracing::warn!(
                    group = %group,
                    timeout_ms = self.send_timeout.as_millis() as u64,
                    "Broadcast to client timed out"
                );
            }
            SendOutcome::Cancelled => {
                tracing::debug!(group = %group, "Broadcast to client cancelled");
            }
        }
    }
}

async fn send_one<H: ConnectionHandle>(
    handle: &H,
    payload: Bytes,
    send_timeout: Duration,
    cancel: &CancellationToken,
) -> SendOutcome {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => SendOutcome::Cancelled,
        result = tokio::time::timeout(send_timeout, handle.send(payload)) => match result {
            Ok(Ok(())) => SendOutcome::Delivered,
            Ok(Err(e)) => SendOutcome::Failed(e),
            Err(_) => SendOutcome::TimedOut,
        },
    }
}
