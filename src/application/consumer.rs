// Telemetry consumer - Drains the queue once per render tick
use crate::application::classifier::ReadingClassifier;
use crate::application::ingestion_queue::IngestionReceiver;
use crate::application::parser::parse_fields;
use crate::domain::color::ColorScale;
use crate::domain::history::HistoryBuffer;
use crate::domain::status::{BatchStats, RenderFrame, StatusSnapshot};
use crate::domain::telemetry::{ClassifiedSample, VectorOrigin};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Owns the history window and last-known strength; nothing else mutates them.
pub struct TelemetryConsumer {
    queue: IngestionReceiver,
    classifier: ReadingClassifier,
    color_scale: ColorScale,
    history: HistoryBuffer,
    last_field_strength: f64,
}

impl TelemetryConsumer {
    pub fn new(
        queue: IngestionReceiver,
        classifier: ReadingClassifier,
        color_scale: ColorScale,
        history: HistoryBuffer,
    ) -> Self {
        Self {
            queue,
            classifier,
            color_scale,
            history,
            last_field_strength: 0.0,
        }
    }

    /// Drain everything queued so far and build this tick's frame.
    pub fn tick(&mut self) -> RenderFrame {
        let lines = self.queue.drain();
        let (status, batch) = self.apply_batch(&lines);

        RenderFrame {
            status,
            history: self.history.snapshot(),
            batch,
            published_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Classify `lines` in order and fold them into the history.
    ///
    /// Each line is independent: idle and unparseable lines are counted and
    /// otherwise ignored.
    pub fn apply_batch<S: AsRef<str>>(
        &mut self,
        lines: &[S],
    ) -> (StatusSnapshot, BatchStats) {
        let mut hall_active = false;
        let mut batch = BatchStats {
            drained: lines.len(),
            ..BatchStats::default()
        };

        for line in lines {
            match self.classifier.classify(&parse_fields(line.as_ref())) {
                ClassifiedSample::Active(reading) => {
                    hall_active = true;
                    batch.active += 1;
                    if reading.origin == VectorOrigin::Defaulted {
                        batch.defaulted += 1;
                    }

                    let strength = reading.strength();
                    let color = self.color_scale.color_for(strength);
                    self.history.push(reading.x, reading.y, reading.z, color);
                    self.last_field_strength = strength;
                }
                ClassifiedSample::Idle => batch.idle += 1,
                ClassifiedSample::Unparseable => batch.unparseable += 1,
            }
        }

        let status = StatusSnapshot {
            hall_active,
            last_field_strength: self.last_field_strength,
        };
        (status, batch)
    }
}

/// Run `consumer` on a fixed cadence, publishing each frame to `frames`.
///
/// Returns once `shutdown` is cancelled or every frame receiver has been dropped.
pub async fn run_consumer(
    mut consumer: TelemetryConsumer,
    interval: Duration,
    frames: watch::Sender<RenderFrame>,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_status_text = String::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested, stopping consumer");
                break;
            }
        }
        let frame = consumer.tick();

        if frame.batch.drained > 0 {
            tracing::debug!(
                drained = frame.batch.drained,
                active = frame.batch.active,
                defaulted = frame.batch.defaulted,
                idle = frame.batch.idle,
                unparseable = frame.batch.unparseable,
                history = frame.history.len(),
                "Processed telemetry batch"
            );
        }

        let status_text = frame.status.status_text();
        if status_text != last_status_text {
            tracing::info!("{}", status_text);
            last_status_text = status_text;
        }

        if frames.send(frame).is_err() {
            tracing::info!("No frame subscribers left, stopping consumer");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ingestion_queue::{ingestion_queue, IngestionSender};
    use crate::domain::color::Jet;

    fn consumer() -> (IngestionSender, TelemetryConsumer) {
        let (tx, rx) = ingestion_queue();
        let consumer = TelemetryConsumer::new(
            rx,
            ReadingClassifier::default(),
            ColorScale::default(),
            HistoryBuffer::default(),
        );
        (tx, consumer)
    }

    #[test]
    fn test_full_vector_line_end_to_end() {
        let (tx, mut consumer) = consumer();
        let line = "JoystickX: 10, JoystickY: 5, Voltage: 0.8, XMag: 3, YMag: 4, ZMag: 0";
        tx.enqueue(line.to_string()).unwrap();

        let frame = consumer.tick();

        assert!(frame.status.hall_active);
        assert_eq!(frame.status.last_field_strength, 5.0);
        assert_eq!(frame.history.xs, vec![3.0]);
        assert_eq!(frame.history.ys, vec![4.0]);
        assert_eq!(frame.history.zs, vec![0.0]);
        assert_eq!(frame.history.colors, vec![ColorScale::default().color_for(5.0)]);
        assert_eq!(
            frame.batch,
            BatchStats {
                drained: 1,
                active: 1,
                defaulted: 0,
                idle: 0,
                unparseable: 0,
            }
        );
    }

    #[test]
    fn test_idle_line_keeps_last_strength() {
        let (tx, mut consumer) = consumer();
        tx.enqueue("Voltage: 0.8, XMag: 3, YMag: 4, ZMag: 0".to_string()).unwrap();
        consumer.tick();

        tx.enqueue("JoystickX: 10, JoystickY: 5, Voltage: 2.0".to_string()).unwrap();
        tx.enqueue("garbage".to_string()).unwrap();
        let frame = consumer.tick();

        assert!(!frame.status.hall_active);
        assert_eq!(frame.status.last_field_strength, 5.0);
        assert_eq!(frame.history.len(), 1);
        assert_eq!(frame.batch.idle, 1);
        assert_eq!(frame.batch.unparseable, 1);
    }

    #[test]
    fn test_empty_tick_is_inactive_and_sticky() {
        let (tx, mut consumer) = consumer();
        tx.enqueue("Voltage: 0.1, XMag: 0, YMag: 0, ZMag: 9".to_string()).unwrap();
        assert!(consumer.tick().status.hall_active);

        let frame = consumer.tick();
        assert!(!frame.status.hall_active);
        assert_eq!(frame.status.last_field_strength, 9.0);
        assert_eq!(frame.batch, BatchStats::default());
    }

    #[test]
    fn test_gate_only_line_records_defaulted_vector() {
        let (_tx, mut consumer) = consumer();
        consumer.apply_batch(&["Voltage: 0.8, XMag: 3, YMag: 4, ZMag: 0"]);
        let (status, batch) = consumer
            .apply_batch(&["JoystickX: 1, JoystickY: 1, Voltage: 0.5, No magnetic field detected"]);

        assert!(status.hall_active);
        assert_eq!(batch.defaulted, 1);
        assert_eq!(status.last_field_strength, 0.0);
        let snapshot = consumer.history.snapshot();
        assert_eq!(snapshot.xs, vec![3.0, 0.0]);
        assert_eq!(snapshot.colors[1], Jet::sample(0.0));
    }

    #[test]
    fn test_last_active_in_batch_wins() {
        let (_tx, mut consumer) = consumer();
        let (status, batch) = consumer.apply_batch(&[
            "Voltage: 0.2, XMag: 6, YMag: 8, ZMag: 0",
            "Voltage: 0.2, XMag: 0, YMag: 0, ZMag: 2",
            "Voltage: 3.3",
        ]);

        assert!(status.hall_active);
        assert_eq!(status.last_field_strength, 2.0);
        assert_eq!(batch.active, 2);
        assert_eq!(consumer.history.snapshot().zs, vec![0.0, 2.0]);
    }

    #[test]
    fn test_history_is_bounded_after_large_batch() {
        let (tx, mut consumer) = consumer();
        for i in 1..=205 {
            tx.enqueue(format!("Voltage: 0.5, XMag: {}, YMag: 0, ZMag: 0", i)).unwrap();
        }

        let frame = consumer.tick();

        assert_eq!(frame.history.len(), 200);
        assert_eq!(frame.history.colors.len(), 200);
        assert_eq!(frame.history.xs.first(), Some(&6.0));
        assert_eq!(frame.history.xs.last(), Some(&205.0));
        assert_eq!(frame.status.last_field_strength, 205.0);
    }

    #[tokio::test]
    async fn test_run_consumer_publishes_frames() {
        let (tx, consumer) = consumer();
        let (frames_tx, mut frames_rx) = watch::channel(RenderFrame::default());
        let shutdown = CancellationToken::new();
        let driver = tokio::spawn(run_consumer(
            consumer,
            Duration::from_millis(10),
            frames_tx,
            shutdown,
        ));

        tx.enqueue("Voltage: 0.8, XMag: 3, YMag: 4, ZMag: 0".to_string()).unwrap();

        let frame = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                frames_rx.changed().await.unwrap();
                let frame = frames_rx.borrow_and_update().clone();
                if !frame.history.is_empty() {
                    return frame;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(frame.status.last_field_strength, 5.0);
        drop(frames_rx);
        tokio::time::timeout(Duration::from_secs(2), driver)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_consumer_stops_on_shutdown() {
        let (_tx, consumer) = consumer();
        let (frames_tx, _frames_rx) = watch::channel(RenderFrame::default());
        let shutdown = CancellationToken::new();
        let driver = tokio::spawn(run_consumer(
            consumer,
            Duration::from_millis(10),
            frames_tx,
            shutdown.clone(),
        ));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(2), driver)
            .await
            .unwrap()
            .unwrap();
    }
}
