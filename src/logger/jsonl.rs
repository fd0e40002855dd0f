//! JSONL diagnostic log: append-only line-delimited JSON.
//!
//! Each line is a self-contained JSON object, assembled in memory and
//! written with a single `write_all` so a tailing process never sees a
//! partial line. The log is write-only: nothing in the core reads it back.
//!
//! Degradation chain: primary file -> stderr with `[WMH-LOG]` prefix ->
//! silent discard. Maintenance operations must never fail because the
//! diagnostic log cannot be written.

#![allow(missing_docs)]

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::outcome::FailureKind;

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Event types matching the maintenance activity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StartupScan,
    StartupDisable,
    ProcessTerminate,
    TempSweep,
    Inventory,
    Network,
    Warning,
    Error,
}

/// A single JSONL log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    pub message: String,
    /// Affected target (entry name, pid, path) when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            message: message.into(),
            target: None,
            kind: None,
            succeeded: None,
            failed: None,
            duration_ms: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_counts(mut self, succeeded: usize, failed: usize) -> Self {
        self.succeeded = Some(succeeded);
        self.failed = Some(failed);
        self
    }

    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Append-only JSONL writer with stderr fallback.
#[derive(Debug)]
pub struct JsonlWriter {
    path: PathBuf,
}

impl JsonlWriter {
    /// Create a writer for `path`, creating parent directories eagerly so
    /// the first append does not race directory creation.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            let _ = std::fs::create_dir_all(parent);
        }
        Self { path }
    }

    /// Append one entry as a single JSON line.
    pub fn write(&self, entry: &LogEntry) {
        let Ok(mut line) = serde_json::to_string(entry) else {
            return;
        };
        line.push('\n');

        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if appended.is_err() {
            // Fallback: stderr. A second failure is silently discarded.
            let _ = write!(std::io::stderr(), "[WMH-LOG] {line}");
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_entry_produces_valid_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diag.jsonl");
        let writer = JsonlWriter::new(&path);

        writer.write(
            &LogEntry::new(EventType::TempSweep, Severity::Info, "sweep done")
                .with_counts(2, 1)
                .with_duration_ms(15),
        );
        writer.write(
            &LogEntry::new(EventType::StartupDisable, Severity::Warning, "denied")
                .with_target("Updater")
                .with_kind(FailureKind::AccessDenied),
        );

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("ts").is_some());
            assert!(value.get("event").is_some());
        }
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["kind"], "access_denied");
        assert_eq!(second["target"], "Updater");
    }

    #[test]
    fn writes_append_rather_than_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diag.jsonl");

        JsonlWriter::new(&path).write(&LogEntry::new(EventType::Warning, Severity::Info, "one"));
        JsonlWriter::new(&path).write(&LogEntry::new(EventType::Warning, Severity::Info, "two"));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("diag.jsonl");
        let writer = JsonlWriter::new(&path);
        writer.write(&LogEntry::new(EventType::Warning, Severity::Info, "hello"));
        assert!(path.exists());
    }

    #[test]
    fn none_fields_are_omitted_from_json() {
        let entry = LogEntry::new(EventType::Inventory, Severity::Info, "fetched");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("target"));
        assert!(!json.contains("duration_ms"));
    }
}
