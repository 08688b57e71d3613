//! History export to CSV or JSON files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::system_monitor::History;
use crate::error::{MonitorError, Result};

const CSV_HEADER: &str = "Time,CPU (%),Memory (%),Disk (%),GPU (%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("json") => Ok(ExportFormat::Json),
            _ => Err(MonitorError::export(format!(
                "unsupported export file '{}', expected .csv or .json",
                path.display()
            ))),
        }
    }
}

/// Write `history` to `path` in the format implied by its extension
pub fn export_history(path: &Path, history: &History) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => write_csv(&mut writer, history)?,
        ExportFormat::Json => write_json(&mut writer, history)?,
    }
    writer.flush()?;

    log::info!(
        "Exported {} samples to {}",
        history.len(),
        path.display()
    );
    Ok(format)
}

pub fn write_csv<W: Write>(writer: &mut W, history: &History) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for row in history.rows() {
        let gpu = row
            .gpu_percent
            .map(|g| g.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        writeln!(
            writer,
            "{},{},{},{},{}",
            row.timestamp, row.cpu_percent, row.memory_percent, row.disk_percent, gpu
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(writer: &mut W, history: &History) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &history.document())?;
    writeln!(writer)?;
    Ok(())
}

/// Serialize `history` to bytes in `format`
pub fn render(history: &History, format: ExportFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ExportFormat::Csv => write_csv(&mut buf, history)?,
        ExportFormat::Json => write_json(&mut buf, history)?,
    }
    Ok(buf)
}
