use std::fs;

use sysmon::core::system_monitor::{GpuUsage, History, HistoryDocument, Sample};
use sysmon::sinks::{export_history, ExportFormat};
use tempfile::TempDir;

fn history() -> History {
    let mut history = History::with_capacity(4);
    for (cpu, gpu) in [(10.0, None), (20.0, Some(55.0))] {
        history.push(Sample {
            timestamp: chrono::Utc::now(),
            cpu_percent: cpu,
            gpu: gpu.map(|usage_percent| GpuUsage {
                usage_percent,
                memory_used_bytes: 0,
                memory_total_bytes: 0,
                temperature_celsius: None,
            }),
            ..Default::default()
        });
    }
    history
}

#[test]
fn test_export_csv() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.csv");

    let format = export_history(&path, &history()).unwrap();
    assert_eq!(format, ExportFormat::Csv);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Time,CPU (%),Memory (%),Disk (%),GPU (%)");
    assert!(lines[1].ends_with(",10,0,0,N/A"));
    assert!(lines[2].ends_with(",20,0,0,55"));
}

#[test]
fn test_export_json_columns_align() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("HISTORY.JSON");

    assert_eq!(export_history(&path, &history()).unwrap(), ExportFormat::Json);

    let doc: HistoryDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc.time.len(), 2);
    assert_eq!(doc.cpu, [10.0, 20.0]);
    assert_eq!(doc.gpu, [None, Some(55.0)]);
}

#[test]
fn test_export_rejects_unknown_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.xml");

    assert!(export_history(&path, &history()).is_err());
    assert!(!path.exists());
}
