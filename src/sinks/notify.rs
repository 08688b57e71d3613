use std::io::Write;

use colored::*;

use crate::error::{MonitorError, Result};

/// Receives one (title, message) pair per alert
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> Result<()>;
}

/// Writes alerts to the log at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        log::warn!("{}: {}", title, message);
        Ok(())
    }
}

/// Prints alerts to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        let now = chrono::Local::now().format("%H:%M:%S");
        let mut stderr = std::io::stderr().lock();
        writeln!(
            stderr,
            "{} {} {}",
            now.to_string().dimmed(),
            format!("[{}]", title).red().bold(),
            message
        )
        .map_err(|e| MonitorError::notification(e.to_string()))
    }
}

/// Forwards to every inner notifier; the first failure is returned after all ran
pub struct FanoutNotifier {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(title, message) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
