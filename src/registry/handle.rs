//! Connection handle abstraction
//!
//! The registry never talks to a socket directly. Anything that can push one
//! opaque payload to a remote peer can be registered.

use std::future::Future;

use bytes::Bytes;

/// Error returned by a failed send
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The underlying connection is already closed
    #[error("connection closed")]
    Closed,
    /// The transport reported an error while writing
    #[error("transport error: {0}")]
    Transport(String),
}

/// A live bidirectional connection that the registry can send to
///
/// Identity is the identity of the `Arc` the handle is registered with, so two
/// handles compare equal only if they are the same allocation.
///
/// Reading from the connection and deciding when it is dead belongs to the
/// owner of the handle, not to the registry.
pub trait ConnectionHandle: Send + Sync + 'static {
    /// Send one payload to the peer
    ///
    /// The dispatcher bounds this call with its own deadline, so
    /// implementations don't need one.
    fn send(&self, payload: Bytes) -> impl Future<Output = Result<(), SendError>> + Send;
}
