// Line source trait - Transport boundary for newline-framed telemetry
use async_trait::async_trait;
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineSourceError {
    #[error("transport read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
    /// Bytes kept arriving past the limit without a terminator; the rest of
    /// that line is discarded.
    #[error("line exceeds {limit} bytes without a newline")]
    Overlong { limit: usize },
    #[error("line source closed")]
    Closed,
}

#[async_trait]
pub trait LineSource: Send {
    /// Read the next line.
    ///
    /// Returns `Ok(None)` when nothing arrived within the source's read timeout.
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError>;
}
