//! Process-table boundary: trait + `sysinfo` and in-memory mock backends.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use std::collections::HashSet;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

use crate::core::outcome::FailureKind;

/// One row of the process table, captured at a single instant.
///
/// Staleness is expected: a pid may no longer exist by the time it is acted
/// on, and the terminator reports that as `NotFound` rather than crashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

/// Snapshot + polite termination against the live process table.
pub trait ProcessProvider: Send + Sync {
    /// Snapshot the process table. A process that disappears or denies
    /// access while being read is silently excluded.
    fn snapshot(&self) -> Vec<ProcessSnapshot>;

    /// Request termination of `pid`. Reports delivery, not exit.
    fn terminate(&self, pid: u32) -> Result<(), FailureKind>;
}

// ──────────────────── sysinfo backend ────────────────────

/// Live backend over the `sysinfo` crate.
pub struct SysinfoProcesses {
    system: Mutex<System>,
}

impl Default for SysinfoProcesses {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProcesses {
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_all()),
        }
    }
}

impl ProcessProvider for SysinfoProcesses {
    fn snapshot(&self) -> Vec<ProcessSnapshot> {
        let mut system = self.system.lock();
        // Two refreshes separated by the minimum interval, otherwise every
        // cpu_usage() reading on a fresh System is zero.
        system.refresh_processes(ProcessesToUpdate::All, true);
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_processes(ProcessesToUpdate::All, true);

        let total_memory = system.total_memory();
        system
            .processes()
            .values()
            .map(|process| {
                let mem_percent = if total_memory == 0 {
                    0.0
                } else {
                    (process.memory() as f64 * 100.0) / total_memory as f64
                };
                ProcessSnapshot {
                    pid: process.pid().as_u32(),
                    name: process.name().to_string_lossy().into_owned(),
                    cpu_percent: f64::from(process.cpu_usage()),
                    mem_percent,
                }
            })
            .collect()
    }

    fn terminate(&self, pid: u32) -> Result<(), FailureKind> {
        let mut system = self.system.lock();
        let target = Pid::from_u32(pid);
        system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
        let Some(process) = system.process(target) else {
            return Err(FailureKind::NotFound);
        };
        // Polite request first; fall back to the unconditional kill where the
        // platform has no notion of SIGTERM.
        let delivered = process
            .kill_with(Signal::Term)
            .unwrap_or_else(|| process.kill());
        if delivered {
            Ok(())
        } else {
            Err(FailureKind::AccessDenied)
        }
    }
}

// ──────────────────── mock backend ────────────────────

/// Deterministic in-memory process table for tests.
#[derive(Debug, Default)]
pub struct MockProcessTable {
    rows: RwLock<Vec<ProcessSnapshot>>,
    denied: RwLock<HashSet<u32>>,
    terminated: RwLock<Vec<u32>>,
}

impl MockProcessTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn insert(&self, pid: u32, name: &str, cpu_percent: f64, mem_percent: f64) {
        self.rows.write().push(ProcessSnapshot {
            pid,
            name: name.to_string(),
            cpu_percent,
            mem_percent,
        });
    }

    /// Make termination of `pid` fail with `AccessDenied` while the row
    /// stays visible in snapshots (a privileged system process).
    pub fn deny(&self, pid: u32) {
        self.denied.write().insert(pid);
    }

    /// Pids that received a termination request, in call order.
    #[must_use]
    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.read().clone()
    }
}

impl ProcessProvider for MockProcessTable {
    fn snapshot(&self) -> Vec<ProcessSnapshot> {
        self.rows.read().clone()
    }

    fn terminate(&self, pid: u32) -> Result<(), FailureKind> {
        if self.denied.read().contains(&pid) {
            return Err(FailureKind::AccessDenied);
        }
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| row.pid != pid);
        if rows.len() == before {
            return Err(FailureKind::NotFound);
        }
        self.terminated.write().push(pid);
        Ok(())
    }
}
