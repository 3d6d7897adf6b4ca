//! Connection registry for grouped fan-out
//!
//! The registry tracks which live connections belong to which named group and
//! pushes payloads to all of them, or to one group, concurrently.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<ConnectionRegistry<H>>
//!                     ┌─────────────────────────┐
//!                     │ groups: HashMap<Name,   │
//!                     │   GroupEntry {          │
//!                     │     members: Vec<Arc<H>>│
//!                     │   }                     │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │ snapshot under read lock
//!                                 ▼
//!                           Dispatcher (lock released)
//!         ┌───────────────────────┼───────────────────────┐
//!         ▼                       ▼                       ▼
//!    send + timeout          send + timeout          send + timeout
//!     [handle A]              [handle B]              [handle C]
//! ```
//!
//! # Lock discipline
//!
//! No network I/O happens while the `groups` lock is held. Broadcasts copy the
//! targeted `Arc` handles out, drop the guard, then dispatch. A slow peer can
//! therefore delay only its own send, never a concurrent `add` or `remove`.
//!
//! Handles that fail a send are not removed here. The read loop that owns the
//! connection sees the same failure and deregisters it.

pub mod config;
pub mod dispatch;
pub mod entry;
pub mod handle;
pub mod store;

pub use config::RegistryConfig;
pub use dispatch::{Dispatcher, Target};
pub use entry::GroupEntry;
pub use handle::{ConnectionHandle, SendError};
pub use store::ConnectionRegistry;
