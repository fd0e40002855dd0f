//! Startup mutator: delete a named entry from every writable autostart root.
//!
//! Per-root contract: value absent -> `NotPresent` (idempotent success);
//! privilege failure -> recorded, remaining roots still attempted. Per-batch
//! contract: entries are independent, one entry's total failure never blocks
//! the others, and reports come back in submission order.

#![allow(missing_docs)]

use serde::Serialize;

use crate::core::outcome::{BatchSummary, FailureKind, Outcome};
use crate::logger::{DiagEvent, DiagLoggerHandle};
use crate::platform::registry::{RegistryProvider, RootRef};
use crate::startup::roots::writable_roots;

/// What happened at one writable root for one entry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootDisposition {
    /// The value existed and was deleted.
    Deleted,
    /// The value (or the root key itself) was not present. Disabling an
    /// already-disabled entry is not an error.
    NotPresent,
    /// The attempt failed; the root may still hold the value.
    Failed(FailureKind),
}

/// Per-root outcome for one disable attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RootOutcome {
    pub root: RootRef,
    pub disposition: RootDisposition,
}

/// Outcomes for one entry name across every writable root, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisableReport {
    pub name: String,
    pub roots: Vec<RootOutcome>,
}

impl DisableReport {
    /// The entry is fully disabled: every root either deleted the value or
    /// never held it. Any per-root failure leaves the entry possibly live.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.roots
            .iter()
            .all(|outcome| !matches!(outcome.disposition, RootDisposition::Failed(_)))
    }

    /// Whether at least one root actually held and deleted the value.
    #[must_use]
    pub fn deleted_anywhere(&self) -> bool {
        self.roots
            .iter()
            .any(|outcome| outcome.disposition == RootDisposition::Deleted)
    }
}

/// Deletes startup registrations through a [`RegistryProvider`].
pub struct StartupMutator<'a> {
    registry: &'a dyn RegistryProvider,
    roots: Vec<RootRef>,
    logger: Option<DiagLoggerHandle>,
}

impl<'a> StartupMutator<'a> {
    /// Mutator over the fixed writable root set (machine hive first).
    pub fn new(registry: &'a dyn RegistryProvider, logger: Option<DiagLoggerHandle>) -> Self {
        Self {
            registry,
            roots: writable_roots().to_vec(),
            logger,
        }
    }

    /// Mutator over an explicit root set (tests, future policy knobs).
    pub fn with_roots(
        registry: &'a dyn RegistryProvider,
        roots: Vec<RootRef>,
        logger: Option<DiagLoggerHandle>,
    ) -> Self {
        Self {
            registry,
            roots,
            logger,
        }
    }

    /// Disable one entry name against every writable root in priority order.
    pub fn disable(&self, name: &str) -> DisableReport {
        let mut roots = Vec::with_capacity(self.roots.len());
        for &root in &self.roots {
            let disposition = match self.registry.delete_value(root, name) {
                Ok(()) => RootDisposition::Deleted,
                // The value being absent — or the whole root key being absent
                // — both mean there is nothing left to disable here.
                Err(FailureKind::NotFound | FailureKind::Unavailable) => {
                    RootDisposition::NotPresent
                }
                Err(kind) => RootDisposition::Failed(kind),
            };
            match disposition {
                RootDisposition::Deleted => self.log(DiagEvent::StartupDisabled {
                    name: name.to_string(),
                    root: root.to_string(),
                }),
                RootDisposition::Failed(kind) => self.log(DiagEvent::StartupDisableFailed {
                    name: name.to_string(),
                    root: root.to_string(),
                    kind,
                }),
                RootDisposition::NotPresent => {}
            }
            roots.push(RootOutcome { root, disposition });
        }
        DisableReport {
            name: name.to_string(),
            roots,
        }
    }

    /// Disable a batch of entry names, attempting each independently.
    ///
    /// Reports are returned in submission order.
    pub fn disable_all(&self, names: &[String]) -> Vec<DisableReport> {
        names.iter().map(|name| self.disable(name)).collect()
    }

    fn log(&self, event: DiagEvent) {
        if let Some(logger) = &self.logger {
            logger.send(event);
        }
    }
}

/// Fold batch reports into the shared summary shape, preserving order.
#[must_use]
pub fn summarize(reports: &[DisableReport]) -> BatchSummary<String> {
    let outcomes: Vec<Outcome<String>> = reports
        .iter()
        .map(|report| {
            if report.ok() {
                Outcome::succeeded(report.name.clone())
            } else {
                let kind = report
                    .roots
                    .iter()
                    .find_map(|outcome| match outcome.disposition {
                        RootDisposition::Failed(kind) => Some(kind),
                        _ => None,
                    })
                    .unwrap_or(FailureKind::Io);
                Outcome::failed(report.name.clone(), kind)
            }
        })
        .collect();
    BatchSummary::from_outcomes(&outcomes)
}
