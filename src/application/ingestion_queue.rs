// Ingestion queue - Unbounded FIFO hand-off from reader to consumer
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("ingestion queue closed: consumer dropped")]
pub struct QueueClosed;

/// Create a single-producer/single-consumer line queue.
///
/// The queue never blocks the producer; the consumer bounds growth by draining
/// everything once per tick.
pub fn ingestion_queue() -> (IngestionSender, IngestionReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IngestionSender { tx }, IngestionReceiver { rx })
}

#[derive(Debug)]
pub struct IngestionSender {
    tx: mpsc::UnboundedSender<String>,
}

impl IngestionSender {
    pub fn enqueue(&self, line: String) -> Result<(), QueueClosed> {
        self.tx.send(line).map_err(|_| QueueClosed)
    }
}

#[derive(Debug)]
pub struct IngestionReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl IngestionReceiver {
    /// Pop every line queued so far, in arrival order, without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(line) => lines.push(line),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        lines
    }
}
