//! Periodic driver for the sampling pipeline.
//!
//! The driver owns the ticker. Each tick runs sample -> record -> notify and
//! publishes the new history on a watch channel. Persistence and cloud
//! upload hang off the tick but never block it: uploads are spawned and
//! report back on a channel drained by the same select loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

use crate::sinks::persistence::{render, ExportFormat};
use crate::sinks::{CloudUploader, Notifier, UploadOutcome};

use super::alerts::{Alert, ThresholdConfig};
use super::history::History;
use super::monitor::Monitor;
use super::notifications::NotificationLog;
use super::sampler::SampleSource;

/// Thresholds shared with whoever may update them between ticks
pub type SharedThresholds = Arc<RwLock<ThresholdConfig>>;

/// Write the history every `every` samples, optionally uploading the same bytes
#[derive(Debug, Clone)]
pub struct PersistPolicy {
    pub path: PathBuf,
    pub every: u64,
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub interval: Duration,
    pub persist: Option<PersistPolicy>,
    pub uploader: Option<CloudUploader>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            persist: None,
            uploader: None,
        }
    }
}

/// Totals reported when the driver stops
#[derive(Debug, Clone)]
pub struct DriverReport {
    pub history: History,
    pub samples: u64,
    pub alerts: u64,
    pub uploads_succeeded: u64,
    pub uploads_failed: u64,
}

pub struct MonitorDriver<S: SampleSource> {
    source: S,
    monitor: Monitor,
    thresholds: SharedThresholds,
    notifier: Box<dyn Notifier>,
    notifications: Arc<Mutex<NotificationLog>>,
    snapshot_tx: watch::Sender<Arc<History>>,
    options: DriverOptions,
    samples: u64,
    alerts: u64,
}

impl<S: SampleSource> MonitorDriver<S> {
    pub fn new(
        source: S,
        capacity: usize,
        thresholds: SharedThresholds,
        notifier: Box<dyn Notifier>,
        options: DriverOptions,
    ) -> Self {
        let monitor = Monitor::new(capacity);
        let (snapshot_tx, _) = watch::channel(Arc::new(monitor.history().clone()));

        Self {
            source,
            monitor,
            thresholds,
            notifier,
            notifications: Arc::new(Mutex::new(NotificationLog::new())),
            snapshot_tx,
            options,
            samples: 0,
            alerts: 0,
        }
    }

    /// Receiver of history snapshots, updated after every tick
    pub fn subscribe(&self) -> watch::Receiver<Arc<History>> {
        self.snapshot_tx.subscribe()
    }

    pub fn notifications(&self) -> Arc<Mutex<NotificationLog>> {
        self.notifications.clone()
    }

    pub fn history(&self) -> &History {
        self.monitor.history()
    }

    /// Run one sample -> record -> notify cycle
    pub fn tick(&mut self) -> Vec<Alert> {
        let sample = self.source.sample();
        let thresholds = *self.thresholds.read();

        let alerts = self.monitor.record(sample, &thresholds);
        self.samples += 1;
        self.alerts += alerts.len() as u64;

        for alert in &alerts {
            if let Err(e) = self.notifier.notify(alert.title(), &alert.message) {
                log::error!("Notification for {} alert failed: {}", alert.kind, e);
            }
        }
        if !alerts.is_empty() {
            let mut log = self.notifications.lock();
            for alert in &alerts {
                log.push(alert);
            }
        }

        // send() only fails when nobody is subscribed
        let _ = self
            .snapshot_tx
            .send(Arc::new(self.monitor.history().clone()));

        log::debug!(
            "Tick {}: {} samples held, {} alerts",
            self.samples,
            self.monitor.history().len(),
            alerts.len()
        );

        alerts
    }

    /// Persist the history if the policy says so. Returns the written bytes.
    fn persist_if_due(&self) -> Option<(String, Vec<u8>)> {
        let policy = self.options.persist.as_ref()?;
        if policy.every == 0 || self.samples % policy.every != 0 {
            return None;
        }

        let result = ExportFormat::from_path(&policy.path)
            .and_then(|format| render(self.monitor.history(), format))
            .and_then(|bytes| {
                std::fs::write(&policy.path, &bytes)?;
                Ok(bytes)
            });

        match result {
            Ok(bytes) => {
                log::debug!("Persisted history to {}", policy.path.display());
                let key = policy
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "history".to_string());
                Some((key, bytes))
            }
            Err(e) => {
                log::error!("Failed to persist history to {}: {}", policy.path.display(), e);
                None
            }
        }
    }

    /// Drive the pipeline until `shutdown` fires
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> DriverReport {
        log::info!(
            "Monitor driver started (interval {} ms, history {})",
            self.options.interval.as_millis(),
            self.monitor.history().capacity()
        );

        let (upload_tx, mut upload_rx) = mpsc::unbounded_channel::<UploadOutcome>();
        let mut in_flight: u64 = 0;
        let mut uploads_succeeded = 0;
        let mut uploads_failed = 0;

        let mut ticker = interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();

                    if let Some((key, bytes)) = self.persist_if_due() {
                        if let Some(ref uploader) = self.options.uploader {
                            uploader.spawn_reporting(key, bytes, upload_tx.clone());
                            in_flight += 1;
                        }
                    }
                }
                Some(outcome) = upload_rx.recv() => {
                    in_flight = in_flight.saturating_sub(1);
                    if outcome.is_success() {
                        uploads_succeeded += 1;
                    } else {
                        uploads_failed += 1;
                    }
                }
                _ = shutdown.recv() => {
                    log::info!("Monitor driver shutting down");
                    break;
                }
            }
        }

        // Only spawned uploads hold senders now, so recv() ends if one dies
        // without reporting. Uploads carry their own timeout.
        drop(upload_tx);
        while in_flight > 0 {
            match upload_rx.recv().await {
                Some(outcome) => {
                    in_flight -= 1;
                    if outcome.is_success() {
                        uploads_succeeded += 1;
                    } else {
                        uploads_failed += 1;
                    }
                }
                None => break,
            }
        }

        DriverReport {
            history: self.monitor.into_history(),
            samples: self.samples,
            alerts: self.alerts,
            uploads_succeeded,
            uploads_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system_monitor::{AlertKind, Sample};
    use crate::error::{MonitorError, Result};
    use std::collections::VecDeque;

    /// Replays fixed CPU values, then repeats the last one
    struct ScriptedSource {
        values: VecDeque<f32>,
        last: f32,
    }

    impl ScriptedSource {
        fn new(values: &[f32]) -> Self {
            Self {
                values: values.iter().copied().collect(),
                last: 0.0,
            }
        }
    }

    impl SampleSource for ScriptedSource {
        fn sample(&mut self) -> Sample {
            if let Some(v) = self.values.pop_front() {
                self.last = v;
            }
            Sample {
                timestamp: chrono::Utc::now(),
                cpu_percent: self.last,
                ..Default::default()
            }
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Notifier for Recorder {
        fn notify(&self, title: &str, _message: &str) -> Result<()> {
            self.0.lock().push(title.to_string());
            Ok(())
        }
    }

    struct Broken;

    impl Notifier for Broken {
        fn notify(&self, _title: &str, _message: &str) -> Result<()> {
            Err(MonitorError::notification("no display"))
        }
    }

    fn thresholds(cpu: f32) -> SharedThresholds {
        Arc::new(RwLock::new(ThresholdConfig {
            cpu,
            ..Default::default()
        }))
    }

    #[test]
    fn test_tick_notifies_and_logs() {
        let recorder = Recorder::default();
        let mut driver = MonitorDriver::new(
            ScriptedSource::new(&[50.0, 90.0, 95.0]),
            3,
            thresholds(80.0),
            Box::new(recorder.clone()),
            DriverOptions::default(),
        );
        let snapshots = driver.subscribe();

        assert!(driver.tick().is_empty());
        assert_eq!(driver.tick().len(), 1);
        assert_eq!(driver.tick().len(), 1);

        assert_eq!(recorder.0.lock().as_slice(), ["CPU Alert", "CPU Alert"]);
        assert_eq!(driver.notifications().lock().filter(AlertKind::Cpu).len(), 2);
        assert_eq!(snapshots.borrow().len(), 3);
    }

    #[test]
    fn test_threshold_update_applies_next_tick() {
        let shared = thresholds(80.0);
        let mut driver = MonitorDriver::new(
            ScriptedSource::new(&[70.0]),
            5,
            shared.clone(),
            Box::new(Recorder::default()),
            DriverOptions::default(),
        );

        assert!(driver.tick().is_empty());
        shared.write().cpu = 60.0;
        assert_eq!(driver.tick().len(), 1);
    }

    #[test]
    fn test_notifier_failure_does_not_stop_pipeline() {
        let mut driver = MonitorDriver::new(
            ScriptedSource::new(&[99.0]),
            2,
            thresholds(10.0),
            Box::new(Broken),
            DriverOptions::default(),
        );

        for _ in 0..4 {
            assert_eq!(driver.tick().len(), 1);
        }
        assert_eq!(driver.history().len(), 2);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history.json");

        let driver = MonitorDriver::new(
            ScriptedSource::new(&[10.0, 20.0, 30.0, 40.0]),
            3,
            thresholds(80.0),
            Box::new(Recorder::default()),
            DriverOptions {
                interval: Duration::from_millis(10),
                persist: Some(PersistPolicy {
                    path: path.clone(),
                    every: 1,
                }),
                uploader: None,
            },
        );
        let mut snapshots = driver.subscribe();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(driver.run(shutdown_rx));

        // Wait until the history is full
        loop {
            snapshots.changed().await.unwrap();
            if snapshots.borrow().len() == 3 {
                break;
            }
        }
        shutdown_tx.send(()).unwrap();

        let report = handle.await.unwrap();
        assert!(report.samples >= 3);
        assert_eq!(report.history.len(), 3);
        assert_eq!(report.alerts, 0);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_hanging_uploads_do_not_block_sampling() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let upload_timeout = Duration::from_millis(600);
        let uploader = CloudUploader::new(
            crate::sinks::CloudTarget::new(format!("http://{}", addr), None),
            upload_timeout,
        )
        .unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let driver = MonitorDriver::new(
            ScriptedSource::new(&[10.0]),
            100,
            thresholds(80.0),
            Box::new(Recorder::default()),
            DriverOptions {
                interval: Duration::from_millis(20),
                persist: Some(PersistPolicy {
                    path: dir.path().join("history.csv"),
                    every: 5,
                }),
                uploader: Some(uploader),
            },
        );
        let mut snapshots = driver.subscribe();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(driver.run(shutdown_rx));

        // Two uploads have been spawned by sample 12 and the first is still
        // waiting on its timeout, yet samples keep coming
        let started = tokio::time::Instant::now();
        loop {
            snapshots.changed().await.unwrap();
            if snapshots.borrow().len() >= 12 {
                break;
            }
        }
        assert!(started.elapsed() < upload_timeout);

        shutdown_tx.send(()).unwrap();
        let drain_started = tokio::time::Instant::now();
        let report = handle.await.unwrap();

        assert!(drain_started.elapsed() < upload_timeout + Duration::from_secs(1));
        assert!(report.samples >= 12);
        assert_eq!(report.uploads_succeeded, 0);
        assert!(report.uploads_failed >= 2);
    }
}
