//! Settings file handling.
//!
//! The settings file is a JSON object. Every recognised key has a default;
//! a missing key takes its default silently, a malformed one takes its
//! default and is reported as a [`ConfigIssue`]. Unknown keys are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::system_monitor::{SamplerConfig, ThresholdConfig};
use crate::error::{MonitorError, Result};

pub const CPU_THRESHOLD: &str = "cpu_threshold";
pub const MEMORY_THRESHOLD: &str = "memory_threshold";
pub const DISK_THRESHOLD: &str = "disk_threshold";
pub const GPU_THRESHOLD: &str = "gpu_threshold";
pub const GPU_MEMORY_THRESHOLD: &str = "gpu_memory_threshold";
pub const UPDATE_INTERVAL: &str = "update_interval";
pub const MAX_PROCESSES: &str = "max_processes";
pub const MAX_CONNECTIONS: &str = "max_connections";
pub const HISTORY_CAPACITY: &str = "history_capacity";
pub const UPLOAD_TIMEOUT_SECS: &str = "upload_timeout_secs";
pub const DISK_MOUNT: &str = "disk_mount";
pub const CLOUD_ENDPOINT: &str = "cloud_endpoint";
pub const CLOUD_TOKEN: &str = "cloud_token";

/// All keys accepted by [`Config::set`]
pub const KNOWN_KEYS: [&str; 13] = [
    CPU_THRESHOLD,
    MEMORY_THRESHOLD,
    DISK_THRESHOLD,
    GPU_THRESHOLD,
    GPU_MEMORY_THRESHOLD,
    UPDATE_INTERVAL,
    MAX_PROCESSES,
    MAX_CONNECTIONS,
    HISTORY_CAPACITY,
    UPLOAD_TIMEOUT_SECS,
    DISK_MOUNT,
    CLOUD_ENDPOINT,
    CLOUD_TOKEN,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub cpu_threshold: u8,
    pub memory_threshold: u8,
    pub disk_threshold: u8,
    pub gpu_threshold: u8,
    pub gpu_memory_threshold: u8,
    /// Sampling period in milliseconds
    pub update_interval: u64,
    pub max_processes: usize,
    pub max_connections: usize,
    pub history_capacity: usize,
    pub upload_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_mount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_threshold: 80,
            memory_threshold: 80,
            disk_threshold: 80,
            gpu_threshold: 80,
            gpu_memory_threshold: 80,
            update_interval: 5000,
            max_processes: 10,
            max_connections: 10,
            history_capacity: 10,
            upload_timeout_secs: 30,
            disk_mount: None,
            cloud_endpoint: None,
            cloud_token: None,
        }
    }
}

/// A key that was present but unusable; its default was applied instead
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub key: String,
    pub reason: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} (using default)", self.key, self.reason)
    }
}

/// Result of loading a settings file
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub issues: Vec<ConfigIssue>,
    pub path: PathBuf,
}

impl Config {
    /// Load from the default location, creating the file with defaults if absent
    pub fn load() -> Result<LoadedConfig> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, creating the file with defaults if absent
    pub fn load_from(path: &Path) -> Result<LoadedConfig> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            log::info!("Created default settings at {}", path.display());
            return Ok(LoadedConfig {
                config,
                issues: Vec::new(),
                path: path.to_path_buf(),
            });
        }

        let data = fs::read_to_string(path)?;

        // An empty or unparsable file falls back to defaults entirely
        let (config, issues) = if data.trim().is_empty() {
            (Config::default(), Vec::new())
        } else {
            match serde_json::from_str::<Value>(&data) {
                Ok(Value::Object(map)) => Self::from_map(&map),
                Ok(_) => (
                    Config::default(),
                    vec![ConfigIssue {
                        key: "<root>".to_string(),
                        reason: "settings must be a JSON object".to_string(),
                    }],
                ),
                Err(e) => (
                    Config::default(),
                    vec![ConfigIssue {
                        key: "<root>".to_string(),
                        reason: format!("invalid JSON: {}", e),
                    }],
                ),
            }
        };

        for issue in &issues {
            log::warn!("Settings {}: {}", path.display(), issue);
        }

        Ok(LoadedConfig {
            config,
            issues,
            path: path.to_path_buf(),
        })
    }

    /// Build a config from a JSON object, defaulting each bad key on its own
    pub fn from_map(map: &Map<String, Value>) -> (Config, Vec<ConfigIssue>) {
        let mut config = Config::default();
        let mut issues = Vec::new();

        for key in KNOWN_KEYS {
            let Some(value) = map.get(key) else {
                continue;
            };
            if let Err(e) = config.apply(key, value) {
                let reason = match e {
                    MonitorError::InvalidConfigValue { reason, .. } => reason,
                    other => other.to_string(),
                };
                issues.push(ConfigIssue {
                    key: key.to_string(),
                    reason,
                });
            }
        }

        (config, issues)
    }

    /// Set one key from its textual form, as typed on the command line
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let is_text = matches!(key, DISK_MOUNT | CLOUD_ENDPOINT | CLOUD_TOKEN);
        let value = match raw.parse::<i64>() {
            Ok(n) if !is_text => Value::from(n),
            _ => Value::from(raw),
        };
        self.apply(key, &value)
    }

    fn apply(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            CPU_THRESHOLD => self.cpu_threshold = parse_threshold(key, value)?,
            MEMORY_THRESHOLD => self.memory_threshold = parse_threshold(key, value)?,
            DISK_THRESHOLD => self.disk_threshold = parse_threshold(key, value)?,
            GPU_THRESHOLD => self.gpu_threshold = parse_threshold(key, value)?,
            GPU_MEMORY_THRESHOLD => self.gpu_memory_threshold = parse_threshold(key, value)?,
            UPDATE_INTERVAL => self.update_interval = parse_positive(key, value)?,
            MAX_PROCESSES => self.max_processes = parse_positive(key, value)? as usize,
            MAX_CONNECTIONS => self.max_connections = parse_positive(key, value)? as usize,
            HISTORY_CAPACITY => self.history_capacity = parse_positive(key, value)? as usize,
            UPLOAD_TIMEOUT_SECS => self.upload_timeout_secs = parse_positive(key, value)?,
            DISK_MOUNT => self.disk_mount = parse_optional_string(key, value)?,
            CLOUD_ENDPOINT => self.cloud_endpoint = parse_optional_string(key, value)?,
            CLOUD_TOKEN => self.cloud_token = parse_optional_string(key, value)?,
            _ => return Err(MonitorError::invalid_value(key, "unknown setting")),
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MonitorError::config("Could not determine config directory"))?;

        Ok(config_dir.join("sysmon").join("config.json"))
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            cpu: self.cpu_threshold as f32,
            memory: self.memory_threshold as f32,
            disk: self.disk_threshold as f32,
            gpu: self.gpu_threshold as f32,
            gpu_memory: self.gpu_memory_threshold as f32,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.update_interval)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        let mut sampler = SamplerConfig::default();
        if let Some(ref mount) = self.disk_mount {
            sampler.disk_mount = PathBuf::from(mount);
        }
        sampler
    }
}

fn parse_integer(key: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| {
            MonitorError::invalid_value(key, format!("expected an integer, got {}", n))
        }),
        other => Err(MonitorError::invalid_value(
            key,
            format!("expected an integer, got {}", other),
        )),
    }
}

fn parse_threshold(key: &str, value: &Value) -> Result<u8> {
    let n = parse_integer(key, value)?;
    if !(0..=100).contains(&n) {
        return Err(MonitorError::invalid_value(
            key,
            format!("{} is outside 0-100", n),
        ));
    }
    Ok(n as u8)
}

fn parse_positive(key: &str, value: &Value) -> Result<u64> {
    let n = parse_integer(key, value)?;
    if n <= 0 {
        return Err(MonitorError::invalid_value(
            key,
            format!("{} must be greater than zero", n),
        ));
    }
    Ok(n as u64)
}

fn parse_optional_string(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(MonitorError::invalid_value(
            key,
            format!("expected a string, got {}", other),
        )),
    }
}
