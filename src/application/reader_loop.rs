// Reader loop - Line source into the ingestion queue
use crate::application::ingestion_queue::IngestionSender;
use crate::application::line_source::LineSource;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub enqueued: u64,
    pub faults: u64,
}

/// Pump lines from `source` into `queue` until the consumer goes away.
///
/// Read faults are logged and skipped, never fatal. A closed source keeps
/// failing on every read, so each fault is followed by `error_backoff`.
pub async fn run_reader_loop<S: LineSource>(
    mut source: S,
    queue: IngestionSender,
    error_backoff: Duration,
) -> ReaderStats {
    let mut stats = ReaderStats::default();

    loop {
        match source.next_line().await {
            Ok(Some(raw)) => {
                let line = raw.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = queue.enqueue(line.to_string()) {
                    tracing::info!("Stopping reader loop: {}", e);
                    break;
                }
                stats.enqueued += 1;
            }
            Ok(None) => {}
            Err(e) => {
                stats.faults += 1;
                tracing::warn!(error = %e, faults = stats.faults, "Error reading from serial");
                if !error_backoff.is_zero() {
                    tokio::time::sleep(error_backoff).await;
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ingestion_queue::ingestion_queue;
    use crate::application::line_source::LineSourceError;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Replays a fixed script, then behaves like a closed port.
    struct ScriptedSource {
        script: VecDeque<Result<Option<String>, LineSourceError>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Option<String>, LineSourceError>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    #[async_trait]
    impl LineSource for ScriptedSource {
        async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
            match self.script.pop_front() {
                Some(item) => item,
                None => {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Err(LineSourceError::Closed)
                }
            }
        }
    }

    fn line(s: &str) -> Result<Option<String>, LineSourceError> {
        Ok(Some(s.to_string()))
    }

    fn invalid_utf8() -> LineSourceError {
        LineSourceError::Decode(String::from_utf8(vec![0xff, 0xfe]).unwrap_err())
    }

    #[tokio::test]
    async fn test_faults_and_blank_lines_do_not_stop_ingestion() {
        let (tx, mut rx) = ingestion_queue();
        let source = ScriptedSource::new(vec![
            line("  Voltage: 0.8, XMag: 3, YMag: 4, ZMag: 0\r\n"),
            Err(invalid_utf8()),
            line("   \r\n"),
            Ok(None),
            Err(LineSourceError::Io(std::io::Error::other("framing error"))),
            line("Voltage: 2.0"),
        ]);
        let reader = tokio::spawn(run_reader_loop(source, tx, Duration::from_millis(1)));

        let mut received = Vec::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while received.len() < 2 && tokio::time::Instant::now() < deadline {
            received.extend(rx.drain());
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        reader.abort();

        assert_eq!(
            received,
            vec!["Voltage: 0.8, XMag: 3, YMag: 4, ZMag: 0", "Voltage: 2.0"]
        );
    }

    #[tokio::test]
    async fn test_loop_ends_when_consumer_dropped() {
        let (tx, rx) = ingestion_queue();
        drop(rx);
        let source = ScriptedSource::new(vec![line("Voltage: 0.1")]);

        let stats = tokio::time::timeout(
            Duration::from_secs(1),
            run_reader_loop(source, tx, Duration::ZERO),
        )
        .await
        .expect("reader loop should stop");

        assert_eq!(stats.enqueued, 0);
    }

    #[tokio::test]
    async fn test_stats_count_faults_before_shutdown() {
        let (tx, rx) = ingestion_queue();
        drop(rx);
        let source = ScriptedSource::new(vec![
            Err(LineSourceError::Closed),
            Ok(None),
            Err(invalid_utf8()),
            line("Voltage: 0.1"),
        ]);

        let stats = run_reader_loop(source, tx, Duration::ZERO).await;

        assert_eq!(stats, ReaderStats { enqueued: 0, faults: 2 });
    }
}
