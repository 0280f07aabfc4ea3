//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

use super::{
    handler::{get_expenses, get_messages, get_summary, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Chat and expense ledger server
///
/// ```ignore
/// let state = AppState::in_memory(&config, user_directory, Arc::new(SystemClock));
/// Server::new(state, config.typing_sweep_interval)
///     .run(&config.bind_addr())
///     .await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    typing_sweep_interval: Duration,
}

impl Server {
    pub fn new(state: AppState, typing_sweep_interval: Duration) -> Self {
        Self {
            state: Arc::new(state),
            typing_sweep_interval,
        }
    }

    /// Router with every endpoint, without binding a socket
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms/{room_id}/messages", get(get_messages))
            .route("/api/rooms/{room_id}/expenses", get(get_expenses))
            .route("/api/rooms/{room_id}/summary", get(get_summary))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Periodically expire typing indicators that were never stopped.
    pub fn spawn_typing_sweep(&self) -> JoinHandle<()> {
        let typing_usecase = self.state.typing_usecase.clone();
        let period = self.typing_sweep_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let expired = typing_usecase.sweep_expired().await;
                if expired > 0 {
                    tracing::debug!("Expired {} typing indicator(s)", expired);
                }
            }
        })
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let app = self.router();
        let sweep = self.spawn_typing_sweep();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        sweep.abort();
        result
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let listener = TcpListener::bind(bind_addr).await?;

        // Start the server
        tracing::info!("Wayfare server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?user_id=<id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
