// Serial line source - Newline framing over an async byte stream
use crate::application::line_source::{LineSource, LineSourceError};
use crate::infrastructure::config::SerialSettings;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

pub type SerialLineSource = StreamLineSource<BufReader<SerialStream>>;

/// The port could not be opened. Only raised at setup and always fatal.
#[derive(Debug, Error)]
#[error("failed to open serial port {port}: {source}")]
pub struct SerialOpenError {
    pub port: String,
    #[source]
    pub source: tokio_serial::Error,
}

/// Open the telemetry port (8N1, no flow control).
///
/// # Errors
/// Returns `SerialOpenError` if the port cannot be opened.
pub fn open_serial(settings: &SerialSettings) -> Result<SerialLineSource, SerialOpenError> {
    let port = tokio_serial::new(settings.port.as_str(), settings.baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|source| SerialOpenError {
            port: settings.port.clone(),
            source,
        })?;

    tracing::info!(
        port = %settings.port,
        baud_rate = settings.baud_rate,
        "Opened serial port"
    );

    Ok(StreamLineSource::new(
        BufReader::new(port),
        settings.read_timeout(),
        settings.max_line_bytes,
    ))
}

/// Splits any buffered async reader into `\n`-terminated lines of at most
/// `max_line_bytes` bytes.
pub struct StreamLineSource<R> {
    reader: R,
    /// Bytes of a line whose terminator has not arrived yet.
    pending: Vec<u8>,
    read_timeout: Duration,
    max_line_bytes: usize,
    /// Set after an overlong line until its terminator is seen.
    discarding: bool,
}

impl<R> StreamLineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, read_timeout: Duration, max_line_bytes: usize) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            read_timeout,
            max_line_bytes: max_line_bytes.max(1),
            discarding: false,
        }
    }

    fn take_line(&mut self) -> Result<Option<String>, LineSourceError> {
        let bytes = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.discarding) {
            return Ok(None);
        }
        Ok(Some(String::from_utf8(bytes)?))
    }
}

#[async_trait]
impl<R> LineSource for StreamLineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        // One byte past the limit is enough to tell an overlong line apart.
        let budget = (self.max_line_bytes + 1).saturating_sub(self.pending.len()) as u64;

        // read_until keeps partial bytes in `pending` when the timeout fires.
        let read = tokio::time::timeout(
            self.read_timeout,
            (&mut self.reader)
                .take(budget)
                .read_until(b'\n', &mut self.pending),
        )
        .await;

        match read {
            Err(_) => Ok(None),
            Ok(Err(e)) => {
                self.pending.clear();
                Err(LineSourceError::Io(e))
            }
            Ok(Ok(0)) if self.pending.is_empty() => Err(LineSourceError::Closed),
            Ok(Ok(_)) if self.pending.ends_with(b"\n") => self.take_line(),
            Ok(Ok(_)) if self.pending.len() > self.max_line_bytes => {
                self.pending.clear();
                if self.discarding {
                    return Ok(None);
                }
                self.discarding = true;
                Err(LineSourceError::Overlong {
                    limit: self.max_line_bytes,
                })
            }
            // End of stream in the middle of a line.
            Ok(Ok(_)) => self.take_line(),
        }
    }
}
