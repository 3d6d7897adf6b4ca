//! Hub server listener
//!
//! Binds the HTTP listener, upgrades `/ws` requests and hands each socket to
//! its own connection task.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio_util::sync::CancellationToken;

use super::config::ServerConfig;
use super::connection::{self, WsConnection};
use crate::counter::{spawn_ticker, CounterState};
use crate::error::Result;
use crate::registry::ConnectionRegistry;
use crate::session::ClientContext;
use crate::stats::ServerStats;

/// State shared by every request handler and connection task
#[derive(Clone)]
pub struct HubState {
    /// Live connections by group
    pub registry: Arc<ConnectionRegistry<WsConnection>>,
    /// The shared counter
    pub counter: Arc<CounterState>,
    /// Cancelled when the server shuts down
    pub shutdown: CancellationToken,
    /// Deadline for direct sends outside a broadcast
    pub send_timeout: Duration,
    default_group: Arc<str>,
    next_session_id: Arc<AtomicU64>,
    accepted: Arc<AtomicU64>,
    connection_semaphore: Option<Arc<Semaphore>>,
    started_at: Instant,
}

impl HubState {
    fn new(config: &ServerConfig) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            registry: Arc::new(ConnectionRegistry::with_config(config.registry.clone())),
            counter: Arc::new(CounterState::new()),
            shutdown: CancellationToken::new(),
            send_timeout: config.registry.send_timeout,
            default_group: Arc::from(config.default_group.as_str()),
            next_session_id: Arc::new(AtomicU64::new(1)),
            accepted: Arc::new(AtomicU64::new(0)),
            connection_semaphore,
            started_at: Instant::now(),
        }
    }

    /// Take a connection slot, `None` when connections are unlimited
    fn try_acquire(
        &self,
    ) -> std::result::Result<Option<OwnedSemaphorePermit>, TryAcquireError> {
        match self.connection_semaphore {
            Some(ref sem) => sem.clone().try_acquire_owned().map(Some),
            None => Ok(None),
        }
    }

    fn next_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Count a completed upgrade
    fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot server-wide statistics
    pub async fn stats(&self) -> ServerStats {
        let registry = self.registry.stats().await;
        ServerStats {
            total_connections: self.accepted.load(Ordering::Relaxed),
            active_connections: registry.connections,
            active_groups: registry.groups,
            counter: self.counter.get().await,
            uptime: self.started_at.elapsed(),
        }
    }
}

/// Counter hub server
pub struct HubServer {
    config: ServerConfig,
    state: HubState,
}

impl HubServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let state = HubState::new(&config);
        Self { config, state }
    }

    /// Get a reference to the connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry<WsConnection>> {
        &self.state.registry
    }

    /// Get a reference to the shared counter
    pub fn counter(&self) -> &Arc<CounterState> {
        &self.state.counter
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws_handler))
            .route("/stats", get(stats_handler))
            .with_state(self.state.clone())
    }

    /// Run the server
    ///
    /// This method blocks until the server fails.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, "Server started");

        let ticker = spawn_ticker(
            Arc::clone(&self.state.counter),
            Arc::clone(&self.state.registry),
            self.config.tick_interval,
            self.state.shutdown.clone(),
        );

        let token = self.state.shutdown.clone();
        let app = self.router();
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("Shutdown signal received");
            // Ends the ticker and every connection read loop
            token.cancel();
        })
        .await;

        self.state.shutdown.cancel();
        if let Err(e) = ticker.await {
            tracing::error!(error = %e, "Counter ticker failed");
        }

        result.map_err(Into::into)
    }
}

#[derive(Debug, Default, Deserialize)]
struct JoinParams {
    group: Option<String>,
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<HubState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    Query(params): Query<JoinParams>,
    headers: HeaderMap,
) -> Response {
    // Check connection limit
    let permit = match state.try_acquire() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    let session_id = state.next_session_id();
    let group = params
        .group
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| state.default_group.to_string());
    let ctx = ClientContext::new(session_id, peer_addr, &headers, group);

    tracing::debug!(session_id = session_id, peer = %peer_addr, "New connection");

    ws.on_failed_upgrade(move |e| {
        tracing::error!(session_id = session_id, error = %e, "Failed to accept WebSocket connection");
    })
    .on_upgrade(move |socket| async move {
        let _permit = permit;
        state.record_accepted();
        connection::run(socket, ctx, state).await;
    })
}

async fn stats_handler(State(state): State<HubState>) -> Json<ServerStats> {
    Json(state.stats().await)
}
