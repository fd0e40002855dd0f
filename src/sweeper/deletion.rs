//! Temp-file deletion with per-path outcome accounting.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::outcome::{BatchSummary, FailureKind, Outcome};
use crate::logger::{DiagEvent, DiagLoggerHandle};

/// Summary of one sweep pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Per-path outcomes in submission order.
    pub outcomes: Vec<Outcome<PathBuf>>,
    /// Number of paths deleted.
    pub succeeded: usize,
    /// Paths that could not be deleted, in submission order.
    pub failed: Vec<PathBuf>,
    /// Wall-clock duration of the pass.
    pub duration: Duration,
}

/// Deletes enumerated temp files, one independent attempt per path.
///
/// The path list is an explicit argument (the walker's output); there is no
/// cached session state between enumeration and deletion.
pub struct TempSweeper {
    logger: Option<DiagLoggerHandle>,
}

impl TempSweeper {
    #[must_use]
    pub fn new(logger: Option<DiagLoggerHandle>) -> Self {
        Self { logger }
    }

    /// Attempt to delete every path. A locked file, a permission failure,
    /// or a path that vanished since enumeration is recorded and the pass
    /// moves on to the next path.
    pub fn delete(&self, paths: &[PathBuf]) -> SweepReport {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(paths.len());

        for path in paths {
            let outcome = match delete_path(path) {
                Ok(()) => Outcome::succeeded(path.clone()),
                Err(kind) => {
                    self.log(DiagEvent::SweepFailure {
                        path: path.to_string_lossy().into_owned(),
                        kind,
                    });
                    Outcome::failed(path.clone(), kind)
                }
            };
            outcomes.push(outcome);
        }

        let summary = BatchSummary::from_outcomes(&outcomes);
        let duration = start.elapsed();
        self.log(DiagEvent::SweepCompleted {
            succeeded: summary.succeeded,
            failed: summary.failed.len(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });

        SweepReport {
            outcomes,
            succeeded: summary.succeeded,
            failed: summary.failed,
            duration,
        }
    }

    fn log(&self, event: DiagEvent) {
        if let Some(logger) = &self.logger {
            logger.send(event);
        }
    }
}

fn delete_path(path: &PathBuf) -> Result<(), FailureKind> {
    let meta = fs::symlink_metadata(path)
        .map_err(|err| FailureKind::from_io_kind(err.kind()))?;
    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|err| FailureKind::from_io_kind(err.kind()))
}
