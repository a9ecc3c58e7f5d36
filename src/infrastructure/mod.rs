// Infrastructure layer - External dependencies and adapters
pub mod chunked_frames;
pub mod config;
pub mod http_response;
pub mod serial_line_source;
