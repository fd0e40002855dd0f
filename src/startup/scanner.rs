//! Hive scanner: enumerate autostart entries across all configured roots.

#![allow(missing_docs)]

use serde::Serialize;

use crate::core::outcome::FailureKind;
use crate::platform::registry::{RegistryProvider, RootRef};

/// One auto-launch registration discovered in a root.
///
/// `name` is unique only within its root; the same name under two roots is
/// two distinct entries and the scanner never deduplicates across roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutostartEntry {
    pub name: String,
    /// Launch command line. Opaque to this system.
    pub command: String,
    pub root: RootRef,
}

/// A root that exists but could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub root: RootRef,
    pub kind: FailureKind,
}

/// Everything one scan pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub entries: Vec<AutostartEntry>,
    pub warnings: Vec<ScanWarning>,
}

/// Enumerate every value in every root, in root order.
///
/// An absent root is skipped silently (many roots are legitimately missing,
/// e.g. no WOW6432Node without the 32-bit layer). A root that exists but
/// denies access is recorded as a warning and the scan continues — one bad
/// root never aborts the pass.
pub fn scan(registry: &dyn RegistryProvider, roots: &[RootRef]) -> ScanReport {
    let mut report = ScanReport::default();
    for &root in roots {
        match registry.enum_values(root) {
            Ok(values) => {
                report
                    .entries
                    .extend(values.into_iter().map(|value| AutostartEntry {
                        name: value.name,
                        command: value.data,
                        root,
                    }));
            }
            Err(FailureKind::Unavailable) => {}
            Err(kind) => report.warnings.push(ScanWarning { root, kind }),
        }
    }
    report
}
