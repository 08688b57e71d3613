use std::io;
use thiserror::Error;

/// Custom error type for the sysmon library
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidConfigValue { key: String, reason: String },

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Upload timed out after {0} ms")]
    UploadTimeout(u64),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the sysmon library
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    /// Create an invalid config value error for a specific key
    pub fn invalid_value<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        MonitorError::InvalidConfigValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        MonitorError::GpuNotAvailable(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        MonitorError::MetricCollection(msg.into())
    }

    pub fn export<S: Into<String>>(msg: S) -> Self {
        MonitorError::Export(msg.into())
    }

    pub fn upload<S: Into<String>>(msg: S) -> Self {
        MonitorError::Upload(msg.into())
    }

    pub fn notification<S: Into<String>>(msg: S) -> Self {
        MonitorError::Notification(msg.into())
    }
}
