// Presentation layer - HTTP surface polled by the visualiser
pub mod app_state;
pub mod handlers;
pub mod router;
