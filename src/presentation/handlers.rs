// HTTP request handlers
use crate::infrastructure::chunked_frames::stream_from_watch;
use crate::infrastructure::http_response::json_response;
use crate::presentation::app_state::AppState;
use axum::{extract::State, http::HeaderMap, response::IntoResponse};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest render frame (status, history columns, batch counts)
pub async fn latest_frame(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let frame = state.latest_frame();
    match json_response(&frame, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Overlay text for the latest frame
pub async fn status_text(State(state): State<Arc<AppState>>) -> String {
    state.latest_frame().status.status_text()
}

/// Stream every published frame as length-prefixed chunks
pub async fn stream_frames(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    stream_from_watch(
        state.frames.clone(),
        state.shutdown.clone(),
        accepts_brotli(&headers),
    )
    .await
}

fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}
