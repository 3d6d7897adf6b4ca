//! WebSocket hub server
//!
//! Accepts connections at `/ws`, registers each one under a group and runs
//! its read loop. `/stats` reports connection and counter statistics.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::WsConnection;
pub use listener::{HubServer, HubState};
