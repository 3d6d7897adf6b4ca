//! Shared counter application
//!
//! The counter hub keeps one integer, increments it on a fixed tick and pushes
//! every change to all registered connections. Any client can reset it.
//!
//! - [`CounterState`] owns the value behind a lock and is shared by `Arc`
//! - [`CounterMessage`] is the JSON wire format
//! - [`spawn_ticker`] runs the periodic increment

pub mod message;
pub mod state;
pub mod ticker;

pub use message::{ClientCommand, CounterMessage};
pub use state::CounterState;
pub use ticker::spawn_ticker;
