// Per-tick status and render frame models
use super::history::HistorySnapshot;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub hall_active: bool,
    /// Strength of the most recent active reading; kept across idle ticks.
    pub last_field_strength: f64,
}

impl StatusSnapshot {
    /// Overlay text shown next to the scatter plot.
    pub fn status_text(&self) -> String {
        format!(
            "Hall: {}    Magnetic Field Strength: {:.2}",
            if self.hall_active { "Active" } else { "Inactive" },
            self.last_field_strength
        )
    }
}

/// Line counts for a single drain of the ingestion queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub drained: usize,
    pub active: usize,
    /// Active readings whose vector fields were missing or invalid.
    pub defaulted: usize,
    pub idle: usize,
    pub unparseable: usize,
}

/// Everything the renderer needs for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderFrame {
    pub status: StatusSnapshot,
    pub history: HistorySnapshot,
    pub batch: BatchStats,
    pub published_at_ms: i64,
}
