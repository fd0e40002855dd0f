//! Shared per-target failure accounting for batch mutations.
//!
//! Every mutating pipeline in this crate (startup mutator, process
//! terminator, temp sweeper) attempts its targets independently and records
//! one [`Outcome`] per target instead of raising an error that would abort
//! the batch. [`BatchSummary`] is the aggregate view callers render.
//!
//! Ordering guarantee: outcomes are recorded in the same order targets were
//! submitted, so callers can correlate requests to results positionally.

use std::fmt;
use std::io::ErrorKind;

use serde::{Deserialize, Serialize};

/// Why a single target failed within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Target vanished between enumeration and mutation. Non-fatal.
    NotFound,
    /// Insufficient privilege. Non-fatal, batch continues.
    AccessDenied,
    /// Root/directory absent at scan time. Silently skipped upstream.
    Unavailable,
    /// Any other OS-level failure (locked file, transient IO).
    Io,
}

impl FailureKind {
    /// Map an `std::io::Error` kind onto the batch failure taxonomy.
    #[must_use]
    pub const fn from_io_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::PermissionDenied => Self::AccessDenied,
            _ => Self::Io,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::AccessDenied => "access denied",
            Self::Unavailable => "unavailable",
            Self::Io => "io failure",
        };
        f.write_str(label)
    }
}

/// Result of one mutation attempt against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T> {
    /// The target the attempt was made against.
    pub target: T,
    /// `None` on success, the failure category otherwise.
    pub error: Option<FailureKind>,
}

impl<T> Outcome<T> {
    /// Record a successful attempt.
    pub const fn succeeded(target: T) -> Self {
        Self {
            target,
            error: None,
        }
    }

    /// Record a failed attempt.
    pub const fn failed(target: T, kind: FailureKind) -> Self {
        Self {
            target,
            error: Some(kind),
        }
    }

    /// Whether the attempt succeeded.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate of a batch: success count plus failed targets in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary<T> {
    /// Number of targets that succeeded.
    pub succeeded: usize,
    /// Targets that failed, in the order they were submitted.
    pub failed: Vec<T>,
}

impl<T: Clone> BatchSummary<T> {
    /// Fold a slice of outcomes into a summary, preserving submission order.
    pub fn from_outcomes(outcomes: &[Outcome<T>]) -> Self {
        let mut summary = Self {
            succeeded: 0,
            failed: Vec::new(),
        };
        for outcome in outcomes {
            if outcome.ok() {
                summary.succeeded += 1;
            } else {
                summary.failed.push(outcome.target.clone());
            }
        }
        summary
    }
}

impl<T> BatchSummary<T> {
    /// Whether every target in the batch succeeded.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}
