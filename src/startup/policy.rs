//! Criticality policy: which startup entries are protected from disabling.
//!
//! Pure classification, no I/O. The absence rule is deliberate: a name not
//! in the table is NOT critical. The filter's job is to surface candidates
//! for explicit user review, not to auto-protect unknowns — nothing is
//! mutated without a confirmation step downstream.

use std::collections::BTreeMap;

use crate::startup::scanner::AutostartEntry;

/// Exact-name lookup table mapping entry names to a protected flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalityPolicy {
    table: BTreeMap<String, bool>,
}

impl CriticalityPolicy {
    /// Build a policy from a name -> critical table (usually from config).
    #[must_use]
    pub fn new(table: BTreeMap<String, bool>) -> Self {
        Self { table }
    }

    /// Classify one entry name. Entries are compared by name only, so the
    /// same name under different roots gets the same classification.
    #[must_use]
    pub fn is_critical(&self, name: &str) -> bool {
        self.table.get(name).copied().unwrap_or(false)
    }

    /// Return the non-critical (disposable) subset, preserving order.
    #[must_use]
    pub fn filter(&self, entries: Vec<AutostartEntry>) -> Vec<AutostartEntry> {
        entries
            .into_iter()
            .filter(|entry| !self.is_critical(&entry.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::startup::roots::autostart_roots;

    fn entry(name: &str) -> AutostartEntry {
        AutostartEntry {
            name: name.to_string(),
            command: "...".to_string(),
            root: autostart_roots()[4],
        }
    }

    fn policy_with(pairs: &[(&str, bool)]) -> CriticalityPolicy {
        CriticalityPolicy::new(
            pairs
                .iter()
                .map(|&(name, critical)| (name.to_string(), critical))
                .collect(),
        )
    }

    #[test]
    fn filter_drops_exactly_the_critical_names() {
        let policy = policy_with(&[("OneDrive", true)]);
        let filtered = policy.filter(vec![entry("OneDrive"), entry("Updater")]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Updater");
    }

    #[test]
    fn absent_name_is_not_critical() {
        let policy = policy_with(&[("OneDrive", true)]);
        assert!(!policy.is_critical("Never Seen Before"));
    }

    #[test]
    fn explicit_false_is_not_critical() {
        let policy = policy_with(&[("Microsoft Teams", false)]);
        let filtered = policy.filter(vec![entry("Microsoft Teams")]);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn same_name_from_both_roots_classified_identically() {
        let policy = policy_with(&[("OneDrive", true)]);
        let mut machine = entry("OneDrive");
        machine.root = autostart_roots()[0];
        let filtered = policy.filter(vec![machine, entry("OneDrive")]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_preserves_input_order() {
        let policy = policy_with(&[("B", true)]);
        let filtered = policy.filter(vec![entry("C"), entry("B"), entry("A")]);
        let names: Vec<&str> = filtered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }
}
