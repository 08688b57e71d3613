//! Collaborators that receive pipeline output.
//!
//! Failures here are reported to the caller and never touch sampler or
//! monitor state.

pub mod cloud;
pub mod notify;
pub mod persistence;

pub use cloud::{CloudTarget, CloudUploader, UploadHandle, UploadOutcome};
pub use notify::{ConsoleNotifier, FanoutNotifier, LogNotifier, Notifier};
pub use persistence::{export_history, render, write_csv, write_json, ExportFormat};
