//! Scalar system gauges: CPU, memory, per-disk usage.
//!
//! Thin readers over single `sysinfo` calls, surfaced by `wmh status`.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

/// Memory usage at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryGauge {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub used_percent: f64,
}

/// One mounted disk's capacity picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskGauge {
    pub name: String,
    pub mount_point: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_percent: f64,
}

/// Global CPU utilization percentage.
///
/// Blocks for the minimum sampling interval; a single reading without a
/// delta is always zero.
#[must_use]
pub fn cpu_percent() -> f64 {
    let mut system = System::new();
    system.refresh_cpu_usage();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    system.refresh_cpu_usage();
    f64::from(system.global_cpu_usage())
}

/// Current memory usage.
#[must_use]
pub fn memory() -> MemoryGauge {
    let mut system = System::new();
    system.refresh_memory();
    let total = system.total_memory();
    let used = system.used_memory();
    MemoryGauge {
        total_bytes: total,
        used_bytes: used,
        used_percent: if total == 0 {
            0.0
        } else {
            (used as f64 * 100.0) / total as f64
        },
    }
}

/// Capacity picture for every mounted disk.
#[must_use]
pub fn disks() -> Vec<DiskGauge> {
    Disks::new_with_refreshed_list()
        .iter()
        .map(|disk| {
            let total = disk.total_space();
            let available = disk.available_space();
            DiskGauge {
                name: disk.name().to_string_lossy().into_owned(),
                mount_point: disk.mount_point().to_string_lossy().into_owned(),
                total_bytes: total,
                available_bytes: available,
                used_percent: if total == 0 {
                    0.0
                } else {
                    ((total - available) as f64 * 100.0) / total as f64
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_gauge_is_consistent() {
        let gauge = memory();
        assert!(gauge.total_bytes > 0);
        assert!(gauge.used_bytes <= gauge.total_bytes);
        assert!((0.0..=100.0).contains(&gauge.used_percent));
    }

    #[test]
    fn disk_percentages_stay_in_range() {
        for disk in disks() {
            assert!(
                (0.0..=100.0).contains(&disk.used_percent),
                "{} out of range",
                disk.mount_point
            );
        }
    }

    #[test]
    fn cpu_percent_is_finite() {
        let pct = cpu_percent();
        assert!(pct.is_finite());
        assert!(pct >= 0.0);
    }
}
