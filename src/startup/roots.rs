//! The fixed, compiled-in set of autostart roots.

use crate::platform::registry::{Hive, RootRef};

/// Per-hive Run key.
pub const RUN: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Run";
/// Per-hive RunOnce key.
pub const RUN_ONCE: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\RunOnce";
/// 32-bit view of the Run key on 64-bit hosts.
pub const WOW64_RUN: &str = "SOFTWARE\\WOW6432Node\\Microsoft\\Windows\\CurrentVersion\\Run";
/// 32-bit view of the RunOnce key on 64-bit hosts.
pub const WOW64_RUN_ONCE: &str =
    "SOFTWARE\\WOW6432Node\\Microsoft\\Windows\\CurrentVersion\\RunOnce";

/// Every root the scanner reads. The WOW6432Node pair legitimately does not
/// exist on hosts without the 32-bit compatibility layer; the scanner skips
/// absent roots silently.
#[must_use]
pub fn autostart_roots() -> [RootRef; 5] {
    [
        RootRef {
            hive: Hive::LocalMachine,
            subkey: RUN,
            writable: true,
        },
        RootRef {
            hive: Hive::LocalMachine,
            subkey: RUN_ONCE,
            writable: false,
        },
        RootRef {
            hive: Hive::LocalMachine,
            subkey: WOW64_RUN,
            writable: false,
        },
        RootRef {
            hive: Hive::LocalMachine,
            subkey: WOW64_RUN_ONCE,
            writable: false,
        },
        RootRef {
            hive: Hive::CurrentUser,
            subkey: RUN,
            writable: true,
        },
    ]
}

/// The roots the mutator deletes from, in fixed priority order: the
/// machine-wide root is attempted before the user root. A name may exist in
/// both; per-root outcomes tell the caller which copies were removed.
#[must_use]
pub fn writable_roots() -> [RootRef; 2] {
    [
        RootRef {
            hive: Hive::LocalMachine,
            subkey: RUN,
            writable: true,
        },
        RootRef {
            hive: Hive::CurrentUser,
            subkey: RUN,
            writable: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_roots_are_a_subset_of_autostart_roots() {
        let all = autostart_roots();
        for root in writable_roots() {
            assert!(all.contains(&root), "{root} missing from scan set");
            assert!(root.writable);
        }
    }

    #[test]
    fn machine_root_has_priority_over_user_root() {
        let [first, second] = writable_roots();
        assert_eq!(first.hive, crate::platform::registry::Hive::LocalMachine);
        assert_eq!(second.hive, crate::platform::registry::Hive::CurrentUser);
    }

    #[test]
    fn scan_set_covers_both_hives_and_wow64() {
        let all = autostart_roots();
        assert_eq!(all.len(), 5);
        assert!(all.iter().any(|r| r.subkey.contains("WOW6432Node")));
        assert!(
            all.iter()
                .any(|r| r.hive == crate::platform::registry::Hive::CurrentUser)
        );
    }
}
