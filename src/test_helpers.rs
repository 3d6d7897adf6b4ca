//! Shared test fixtures

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;

use crate::registry::{ConnectionHandle, SendError};

/// How a [`MockHandle`] reacts to a send
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Record the payload and succeed
    Accept,
    /// Fail immediately as if the peer were gone
    Fail,
    /// Never complete
    Hang,
    /// Succeed after the given delay
    Delay(Duration),
    /// Panic inside the send
    Panic,
}

/// In-memory connection handle that records what it was sent
pub struct MockHandle {
    behavior: Behavior,
    attempts: AtomicUsize,
    received: Mutex<Vec<Bytes>>,
}

impl MockHandle {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            attempts: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        })
    }

    /// Number of sends started on this handle
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Payloads delivered successfully, in order
    pub fn received(&self) -> Vec<Bytes> {
        self.received.lock().unwrap().clone()
    }
}

impl ConnectionHandle for MockHandle {
    fn send(&self, payload: Bytes) -> impl std::future::Future<Output = Result<(), SendError>> + Send {
        async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Accept => {}
                Behavior::Fail => return Err(SendError::Closed),
                Behavior::Hang => std::future::pending::<()>().await,
                Behavior::Delay(delay) => tokio::time::sleep(delay).await,
                Behavior::Panic => panic!("send panicked"),
            }
            self.received.lock().unwrap().push(payload);
            Ok(())
        }
    }
}
