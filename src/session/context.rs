//! Client context
//!
//! Information about one accepted WebSocket connection, used for logging and
//! deregistration.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

/// Header set by reverse proxies carrying the original client address
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Context for a single client connection
#[derive(Debug, Clone)]
pub struct ClientContext {
    /// Unique session ID
    pub session_id: u64,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Client identity for logs (forwarded address or peer address)
    pub client_id: String,

    /// Group the connection is registered under
    pub group: String,

    /// When the connection was accepted
    pub connected_at: Instant,
}

impl ClientContext {
    /// Create a new context
    pub fn new(session_id: u64, peer_addr: SocketAddr, headers: &HeaderMap, group: String) -> Self {
        Self {
            session_id,
            peer_addr,
            client_id: client_id(headers, peer_addr),
            group,
            connected_at: Instant::now(),
        }
    }

    /// Get connection duration
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Pick the identity to log for a client
///
/// Prefers `X-Forwarded-For` as sent by the proxy, falling back to the socket
/// peer address.
pub fn client_id(headers: &HeaderMap, peer_addr: SocketAddr) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| peer_addr.to_string(), str::to_owned)
}
