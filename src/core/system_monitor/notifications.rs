//! Record of alerts that were forwarded to the notification sink.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::alerts::{Alert, AlertKind};

const MAX_NOTIFICATIONS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub received_at: DateTime<Local>,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}: {}",
            self.received_at.format("%Y-%m-%d %H:%M:%S"),
            self.title,
            self.message
        )
    }
}

/// Timestamped log of notifications, oldest dropped past a fixed bound
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    limit: usize,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::with_limit(MAX_NOTIFICATIONS)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, alert: &Alert) {
        if self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(Notification {
            received_at: Local::now(),
            kind: alert.kind,
            title: alert.title().to_string(),
            message: alert.message.clone(),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Entries for one metric kind, oldest first
    pub fn filter(&self, kind: AlertKind) -> Vec<&Notification> {
        self.entries.iter().filter(|n| n.kind == kind).collect()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(kind: AlertKind) -> Alert {
        Alert {
            kind,
            message: format!("{} is high", kind),
            value: 90.0,
            threshold: 80.0,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_filter_by_kind() {
        let mut log = NotificationLog::new();
        log.push(&alert(AlertKind::Cpu));
        log.push(&alert(AlertKind::Disk));
        log.push(&alert(AlertKind::Cpu));

        let cpu = log.filter(AlertKind::Cpu);
        assert_eq!(cpu.len(), 2);
        assert!(cpu.iter().all(|n| n.title == "CPU Alert"));
        assert!(log.filter(AlertKind::GpuMemory).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut log = NotificationLog::new();
        log.push(&alert(AlertKind::Memory));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_bounded() {
        let mut log = NotificationLog::with_limit(2);
        log.push(&alert(AlertKind::Cpu));
        log.push(&alert(AlertKind::Memory));
        log.push(&alert(AlertKind::Disk));

        let kinds: Vec<_> = log.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Memory, AlertKind::Disk]);
    }

    #[test]
    fn test_display_line() {
        let mut log = NotificationLog::new();
        log.push(&alert(AlertKind::Gpu));
        let line = log.iter().next().map(|n| n.to_string()).unwrap_or_default();
        assert!(line.ends_with("GPU Alert: gpu is high"));
    }
}
