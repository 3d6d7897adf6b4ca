//! WebSocket connection handling
//!
//! [`WsConnection`] is the registry handle for one accepted socket. [`run`]
//! owns the read side: it registers the handle, serves client commands until
//! the link fails, then deregisters and closes.

use std::future::Future;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use super::listener::HubState;
use crate::counter::ticker::publish;
use crate::counter::{ClientCommand, CounterMessage};
use crate::registry::{ConnectionHandle, SendError};
use crate::session::ClientContext;

/// Write half of an accepted WebSocket
pub struct WsConnection {
    session_id: u64,
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WsConnection {
    /// Wrap the write half of a socket
    pub fn new(session_id: u64, sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            session_id,
            sink: Mutex::new(sink),
        }
    }

    /// Session this connection belongs to
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Send a close frame and shut the write half down
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.close().await {
            tracing::debug!(session_id = self.session_id, error = %e, "Close failed");
        }
    }
}

impl ConnectionHandle for WsConnection {
    fn send(&self, payload: Bytes) -> impl Future<Output = Result<(), SendError>> + Send {
        async move {
            // Counter traffic is JSON; anything else goes out as binary
            let message = match std::str::from_utf8(&payload) {
                Ok(text) => Message::Text(text.into()),
                Err(_) => Message::Binary(payload),
            };

            let mut sink = self.sink.lock().await;
            sink.send(message)
                .await
                .map_err(|e| SendError::Transport(e.to_string()))
        }
    }
}

/// Serve one upgraded socket until it closes
pub async fn run(socket: WebSocket, ctx: ClientContext, state: HubState) {
    let (sink, mut stream) = socket.split();
    let conn = Arc::new(WsConnection::new(ctx.session_id, sink));

    state.registry.add(&ctx.group, Arc::clone(&conn)).await;
    tracing::info!(
        session_id = ctx.session_id,
        client = %ctx.client_id,
        group = %ctx.group,
        "Client connected"
    );

    send_welcome(&conn, &ctx, &state).await;

    loop {
        let message = tokio::select! {
            _ = state.shutdown.cancelled() => break,
            next = stream.next() => match next {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    tracing::debug!(session_id = ctx.session_id, error = %e, "Read failed");
                    break;
                }
                None => break,
            },
        };

        match message {
            Message::Text(text) => handle_text(text.as_str(), &ctx, &state).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.registry.remove(&ctx.group, &conn).await;
    conn.close().await;

    tracing::info!(
        session_id = ctx.session_id,
        client = %ctx.client_id,
        group = %ctx.group,
        duration_secs = ctx.duration().as_secs(),
        "Client disconnected"
    );
}

/// Send the current counter to a freshly registered client
async fn send_welcome(conn: &WsConnection, ctx: &ClientContext, state: &HubState) {
    let current = state.counter.get().await;
    let payload = match CounterMessage::update(current).to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Failed to marshal counter message");
            return;
        }
    };

    match tokio::time::timeout(state.send_timeout, conn.send(payload)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::debug!(session_id = ctx.session_id, error = %e, "Welcome send failed");
        }
        Err(_) => {
            tracing::debug!(session_id = ctx.session_id, "Welcome send timed out");
        }
    }
}

async fn handle_text(text: &str, ctx: &ClientContext, state: &HubState) {
    let message: CounterMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(client = %ctx.client_id, error = %e, "Failed to parse message");
            return;
        }
    };

    match message.command() {
        ClientCommand::Reset => {
            let value = state.counter.reset().await;
            tracing::info!(client = %ctx.client_id, "Counter reset by client");

            // Publish off the read loop so a slow peer can't stall this reader
            let registry = Arc::clone(&state.registry);
            let cancel = state.shutdown.clone();
            tokio::spawn(async move {
                publish(&registry, &cancel, value).await;
            });
        }
        ClientCommand::Ignore => {
            tracing::debug!(client = %ctx.client_id, kind = %message.kind, "Ignoring message");
        }
    }
}
