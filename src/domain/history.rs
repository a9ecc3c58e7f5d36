// Sliding-window history of accepted magnetic samples
use super::color::DisplayColor;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// Last `capacity` accepted samples as four parallel columns.
///
/// All columns always have the same length; eviction drops the front of every
/// column inside the same `push` call.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    xs: VecDeque<f64>,
    ys: VecDeque<f64>,
    zs: VecDeque<f64>,
    colors: VecDeque<DisplayColor>,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            xs: VecDeque::with_capacity(capacity + 1),
            ys: VecDeque::with_capacity(capacity + 1),
            zs: VecDeque::with_capacity(capacity + 1),
            colors: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, x: f64, y: f64, z: f64, color: DisplayColor) {
        self.xs.push_back(x);
        self.ys.push_back(y);
        self.zs.push_back(z);
        self.colors.push_back(color);

        while self.xs.len() > self.capacity {
            self.xs.pop_front();
            self.ys.pop_front();
            self.zs.pop_front();
            self.colors.pop_front();
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            xs: self.xs.iter().copied().collect(),
            ys: self.ys.iter().copied().collect(),
            zs: self.zs.iter().copied().collect(),
            colors: self.colors.iter().copied().collect(),
        }
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Immutable copy of the history handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub zs: Vec<f64>,
    pub colors: Vec<DisplayColor>,
}

impl HistorySnapshot {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}
