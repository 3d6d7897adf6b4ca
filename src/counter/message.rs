//! Counter wire messages
//!
//! Every frame is a JSON object with a `type` field. The server sends
//! `{"type":"update","counter":N}`; clients send `{"type":"reset"}`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Message type sent on every counter change
pub const UPDATE: &str = "update";

/// Message type a client sends to zero the counter
pub const RESET: &str = "reset";

/// A counter frame as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterMessage {
    /// Message type
    #[serde(rename = "type")]
    pub kind: String,
    /// Counter value (absent or ignored on client commands)
    #[serde(default)]
    pub counter: i64,
}

impl CounterMessage {
    /// Update message carrying the current value
    pub fn update(counter: i64) -> Self {
        Self {
            kind: UPDATE.to_owned(),
            counter,
        }
    }

    /// Encode as a JSON payload ready for broadcast
    pub fn to_payload(&self) -> serde_json::Result<Bytes> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    /// Interpret a client frame
    pub fn command(&self) -> ClientCommand {
        match self.kind.as_str() {
            RESET => ClientCommand::Reset,
            _ => ClientCommand::Ignore,
        }
    }
}

/// What a client frame asks the server to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Set the counter back to zero
    Reset,
    /// Unknown or server-only type
    Ignore,
}
