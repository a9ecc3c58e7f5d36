// HTTP routes and server lifecycle
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, latest_frame, status_text, stream_frames};
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/frame", get(latest_frame))
        .route("/status", get(status_text))
        .route("/frames/stream", get(stream_frames))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `state.shutdown` is cancelled.
///
/// The same token ends every open `/frames/stream` response, so the graceful
/// shutdown does not wait on long-lived clients.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}
