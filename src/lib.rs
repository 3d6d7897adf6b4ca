//! Grouped WebSocket connection registry with isolated fan-out broadcast
//!
//! The core is [`ConnectionRegistry`]: live connections join and leave named
//! groups at any time while broadcasts to one group, or to all of them, run
//! concurrently. Every target of a broadcast gets its own send deadline, so a
//! stalled peer only ever delays itself.
//!
//! Around the core sits a small counter hub ([`server::HubServer`]) that
//! registers each WebSocket, ticks a shared counter and pushes every change
//! to all clients.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use tokio_util::sync::CancellationToken;
//! use wshub::{ConnectionHandle, ConnectionRegistry, SendError};
//!
//! struct Printer;
//!
//! impl ConnectionHandle for Printer {
//!     async fn send(&self, payload: Bytes) -> Result<(), SendError> {
//!         tracing::info!(len = payload.len(), "sent");
//!         Ok(())
//!     }
//! }
//!
//! # async fn demo() {
//! let registry = ConnectionRegistry::new();
//! let handle = Arc::new(Printer);
//! registry.add("lobby", Arc::clone(&handle)).await;
//!
//! let report = registry
//!     .broadcast_to_group(&CancellationToken::new(), "lobby", Bytes::from_static(b"hi"))
//!     .await;
//! assert_eq!(report.delivered, 1);
//!
//! registry.remove("lobby", &handle).await;
//! # }
//! ```

pub mod counter;
pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

#[cfg(test)]
mod test_helpers;

pub use error::{Error, Result};
pub use registry::{ConnectionHandle, ConnectionRegistry, RegistryConfig, SendError};
pub use server::{HubServer, ServerConfig};
pub use stats::BroadcastReport;
