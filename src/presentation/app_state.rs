// Application state for HTTP handlers
use crate::domain::status::RenderFrame;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Read-only view of the consumer's output; handlers never mutate pipeline state.
#[derive(Clone)]
pub struct AppState {
    pub frames: watch::Receiver<RenderFrame>,
    /// Cancelled when the service shuts down; open frame streams end with it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn latest_frame(&self) -> RenderFrame {
        self.frames.borrow().clone()
    }
}
