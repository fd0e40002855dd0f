//! Diagnostic logging: a dedicated writer thread fed through a bounded channel.
//!
//! All other threads send [`DiagEvent`] values via non-blocking `try_send`,
//! so a slow disk can never stall a scan or mutation batch; overflow is
//! counted, not queued. The writer thread owns the [`JsonlWriter`] and is
//! the only place that touches the log file.

pub mod jsonl;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::core::config::LoggingConfig;
use crate::core::outcome::FailureKind;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};

/// Bounded channel capacity for log events.
const CHANNEL_CAPACITY: usize = 1024;

/// Events the maintenance pipelines report.
#[derive(Debug, Clone)]
pub enum DiagEvent {
    /// A startup scan pass finished.
    ScanCompleted {
        roots: usize,
        entries: usize,
        warnings: usize,
    },
    /// A startup value was deleted from one root.
    StartupDisabled { name: String, root: String },
    /// A startup deletion attempt failed at one root.
    StartupDisableFailed {
        name: String,
        root: String,
        kind: FailureKind,
    },
    /// A termination request was delivered.
    ProcessTerminated { pid: u32 },
    /// A termination request failed.
    ProcessTerminationFailed { pid: u32, kind: FailureKind },
    /// A temp sweep finished.
    SweepCompleted {
        succeeded: usize,
        failed: usize,
        duration_ms: u64,
    },
    /// One temp path could not be deleted.
    SweepFailure { path: String, kind: FailureKind },
    /// The inventory collaborator returned entries.
    InventoryFetched { count: usize },
    /// The connection-listing collaborator returned rows.
    ConnectionsFetched { count: usize },
    /// Free-form warning.
    Warning { message: String },
    /// Free-form error with a WMH code.
    Error { code: String, message: String },
    /// Sentinel requesting graceful shutdown of the writer thread.
    Shutdown,
}

/// Thread-safe, cheaply-cloneable handle for sending log events.
#[derive(Clone)]
pub struct DiagLoggerHandle {
    tx: Sender<DiagEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl DiagLoggerHandle {
    /// Send an event to the writer thread. Non-blocking: when the channel is
    /// full the event is dropped and counted.
    pub fn send(&self, event: DiagEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of events dropped due to back-pressure.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Request graceful shutdown. Blocking send so the sentinel is not lost.
    pub fn shutdown(&self) {
        let _ = self.tx.send(DiagEvent::Shutdown);
    }
}

/// Spawn the writer thread. Returns the handle plus the join handle so the
/// caller can drain the channel on exit.
#[must_use]
pub fn spawn(config: &LoggingConfig) -> (DiagLoggerHandle, JoinHandle<()>) {
    let (tx, rx) = bounded::<DiagEvent>(CHANNEL_CAPACITY);
    let writer = JsonlWriter::new(&config.jsonl_path);
    let join = thread::spawn(move || writer_loop(&rx, &writer));
    (
        DiagLoggerHandle {
            tx,
            dropped_events: Arc::new(AtomicU64::new(0)),
        },
        join,
    )
}

fn writer_loop(rx: &Receiver<DiagEvent>, writer: &JsonlWriter) {
    while let Ok(event) = rx.recv() {
        if matches!(event, DiagEvent::Shutdown) {
            return;
        }
        writer.write(&entry_for(event));
    }
}

fn entry_for(event: DiagEvent) -> LogEntry {
    match event {
        DiagEvent::ScanCompleted {
            roots,
            entries,
            warnings,
        } => LogEntry::new(
            EventType::StartupScan,
            if warnings == 0 {
                Severity::Info
            } else {
                Severity::Warning
            },
            format!("scanned {roots} roots, found {entries} entries, {warnings} warnings"),
        ),
        DiagEvent::StartupDisabled { name, root } => LogEntry::new(
            EventType::StartupDisable,
            Severity::Info,
            format!("disabled startup entry in {root}"),
        )
        .with_target(name),
        DiagEvent::StartupDisableFailed { name, root, kind } => LogEntry::new(
            EventType::StartupDisable,
            Severity::Warning,
            format!("disable failed in {root}"),
        )
        .with_target(name)
        .with_kind(kind),
        DiagEvent::ProcessTerminated { pid } => LogEntry::new(
            EventType::ProcessTerminate,
            Severity::Info,
            "termination request delivered",
        )
        .with_target(pid.to_string()),
        DiagEvent::ProcessTerminationFailed { pid, kind } => LogEntry::new(
            EventType::ProcessTerminate,
            Severity::Warning,
            "termination request failed",
        )
        .with_target(pid.to_string())
        .with_kind(kind),
        DiagEvent::SweepCompleted {
            succeeded,
            failed,
            duration_ms,
        } => LogEntry::new(EventType::TempSweep, Severity::Info, "temp sweep completed")
            .with_counts(succeeded, failed)
            .with_duration_ms(duration_ms),
        DiagEvent::SweepFailure { path, kind } => LogEntry::new(
            EventType::TempSweep,
            Severity::Warning,
            "could not delete temp file",
        )
        .with_target(path)
        .with_kind(kind),
        DiagEvent::InventoryFetched { count } => LogEntry::new(
            EventType::Inventory,
            Severity::Info,
            format!("inventory returned {count} entries"),
        ),
        DiagEvent::ConnectionsFetched { count } => LogEntry::new(
            EventType::Network,
            Severity::Info,
            format!("connection listing returned {count} rows"),
        ),
        DiagEvent::Warning { message } => {
            LogEntry::new(EventType::Warning, Severity::Warning, message)
        }
        DiagEvent::Error { code, message } => {
            LogEntry::new(EventType::Error, Severity::Error, format!("{code}: {message}"))
        }
        DiagEvent::Shutdown => unreachable!("shutdown handled by writer loop"),
    }
}
