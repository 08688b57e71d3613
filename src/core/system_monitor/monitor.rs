use super::alerts::{evaluate_alerts, Alert, ThresholdConfig};
use super::history::History;
use super::metrics::Sample;

/// Rolling history plus threshold evaluation.
///
/// The monitor performs no I/O. Every call to [`Monitor::record`] stores the
/// sample and reports all metrics currently above their thresholds, whether
/// or not they were already above them on the previous call.
#[derive(Debug, Clone, Default)]
pub struct Monitor {
    history: History,
}

impl Monitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::with_capacity(capacity),
        }
    }

    /// Append `sample` to the history and evaluate it against `thresholds`
    pub fn record(&mut self, sample: Sample, thresholds: &ThresholdConfig) -> Vec<Alert> {
        let alerts = evaluate_alerts(&sample, thresholds);
        self.history.push(sample);
        alerts
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }
}
