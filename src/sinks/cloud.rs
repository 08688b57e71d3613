//! Background upload of exported data to an HTTP object store.
//!
//! Uploads run as spawned tokio tasks. The caller gets either an
//! [`UploadHandle`] to await, or the outcome is delivered on a channel so a
//! sampling loop can keep ticking while the upload is in flight.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{MonitorError, Result};

/// Where uploads go. The token is passed through as a bearer credential
/// without interpretation.
#[derive(Clone)]
pub struct CloudTarget {
    pub endpoint: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for CloudTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudTarget")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CloudTarget {
    pub fn new<S: Into<String>>(endpoint: S, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
        }
    }

    pub fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}

/// Completion report for one upload
#[derive(Debug)]
pub struct UploadOutcome {
    pub key: String,
    pub bytes: usize,
    pub result: Result<()>,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Awaitable handle for a spawned upload
pub struct UploadHandle {
    key: String,
    task: JoinHandle<UploadOutcome>,
}

impl UploadHandle {
    /// Wait for the upload to finish. A panicked task is reported as a failure.
    pub async fn wait(self) -> UploadOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => UploadOutcome {
                key: self.key,
                bytes: 0,
                result: Err(MonitorError::upload(format!("upload task aborted: {}", e))),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudUploader {
    client: reqwest::Client,
    target: CloudTarget,
    timeout: Duration,
}

impl CloudUploader {
    pub fn new(target: CloudTarget, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sysmon/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MonitorError::upload(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            target,
            timeout,
        })
    }

    pub fn target(&self) -> &CloudTarget {
        &self.target
    }

    /// Upload `data` under `key`, failing after the configured timeout
    pub async fn upload(&self, key: &str, data: Vec<u8>) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.put(key, data)).await {
            Ok(result) => result,
            Err(_) => Err(MonitorError::UploadTimeout(self.timeout.as_millis() as u64)),
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let url = self.target.object_url(key);

        let mut request = self.client.put(&url).body(data);
        if let Some(ref token) = self.target.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MonitorError::upload(format!("PUT {} failed: {}", url, e)))?;

        response
            .error_for_status()
            .map_err(|e| MonitorError::upload(format!("PUT {} rejected: {}", url, e)))?;

        Ok(())
    }

    async fn run(self, key: String, data: Vec<u8>) -> UploadOutcome {
        let bytes = data.len();
        log::info!("Uploading {} ({} bytes)", key, bytes);

        let result = self.upload(&key, data).await;
        match result {
            Ok(()) => log::info!("Upload of {} finished", key),
            Err(ref e) => log::error!("Upload of {} failed: {}", key, e),
        }

        UploadOutcome { key, bytes, result }
    }

    /// Start an upload in the background. Must be called inside a tokio runtime.
    pub fn spawn(&self, key: String, data: Vec<u8>) -> UploadHandle {
        let uploader = self.clone();
        let task = tokio::spawn(uploader.run(key.clone(), data));
        UploadHandle { key, task }
    }

    /// Start an upload whose outcome is sent on `reports` instead of awaited
    pub fn spawn_reporting(
        &self,
        key: String,
        data: Vec<u8>,
        reports: mpsc::UnboundedSender<UploadOutcome>,
    ) {
        let uploader = self.clone();
        tokio::spawn(async move {
            let outcome = uploader.run(key, data).await;
            // The receiver is gone when the driver already shut down
            let _ = reports.send(outcome);
        });
    }
}
