use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::metrics::Sample;

pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Bounded FIFO buffer of recent samples
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    samples: VecDeque<Sample>,
}

/// One exported history row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub timestamp: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
    pub gpu_percent: Option<f32>,
}

/// History as parallel arrays of equal length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    pub time: Vec<String>,
    pub cpu: Vec<f32>,
    pub memory: Vec<f32>,
    pub disk: Vec<f32>,
    pub gpu: Vec<Option<f32>>,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    /// A zero capacity is raised to one so the latest sample is always kept
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn rows(&self) -> Vec<HistoryRow> {
        self.samples
            .iter()
            .map(|s| HistoryRow {
                timestamp: s.timestamp.to_rfc3339(),
                cpu_percent: s.cpu_percent,
                memory_percent: s.memory.percent,
                disk_percent: s.disk.percent,
                gpu_percent: s.gpu.map(|g| g.usage_percent),
            })
            .collect()
    }

    pub fn document(&self) -> HistoryDocument {
        let mut doc = HistoryDocument::default();
        for row in self.rows() {
            doc.time.push(row.timestamp);
            doc.cpu.push(row.cpu_percent);
            doc.memory.push(row.memory_percent);
            doc.disk.push(row.disk_percent);
            doc.gpu.push(row.gpu_percent);
        }
        doc
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
