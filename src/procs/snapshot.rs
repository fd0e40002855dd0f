//! Process enumeration and deterministic ranking.

use std::cmp::Ordering;

use crate::platform::procs::{ProcessProvider, ProcessSnapshot};

/// Snapshot the process table through the provider.
pub fn snapshot(provider: &dyn ProcessProvider) -> Vec<ProcessSnapshot> {
    provider.snapshot()
}

/// Rank rows by the composite key `(cpu_percent, mem_percent)` descending.
///
/// The sort is stable, so rows tied on both keys keep the underlying
/// enumeration order.
#[must_use]
pub fn ranked(mut rows: Vec<ProcessSnapshot>) -> Vec<ProcessSnapshot> {
    rows.sort_by(|a, b| {
        (b.cpu_percent, b.mem_percent)
            .partial_cmp(&(a.cpu_percent, a.mem_percent))
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// The `k` highest-ranked processes.
pub fn top(provider: &dyn ProcessProvider, k: usize) -> Vec<ProcessSnapshot> {
    let mut rows = ranked(provider.snapshot());
    rows.truncate(k);
    rows
}
