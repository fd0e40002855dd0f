//! Registry boundary: trait + Windows (`winreg`) and in-memory mock backends.
//!
//! The trait surface is deliberately narrow: enumerate the values of one
//! root, delete one value from one root. Failures are expressed in the
//! batch taxonomy
//! ([`FailureKind`]) so callers can fold them straight into outcome records.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::core::errors::{Result, WmhError};
use crate::core::outcome::FailureKind;

/// Top-level registry namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Hive {
    LocalMachine,
    CurrentUser,
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LocalMachine => "HKLM",
            Self::CurrentUser => "HKCU",
        };
        f.write_str(label)
    }
}

/// Address of one autostart root: hive + subkey, plus whether this root is
/// part of the writable mutation set. Serialize-only: the `&'static str`
/// subkey comes from the compiled-in root tables, never from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RootRef {
    pub hive: Hive,
    pub subkey: &'static str,
    pub writable: bool,
}

impl fmt::Display for RootRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.hive, self.subkey)
    }
}

/// A name/command value pair read from one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub name: String,
    pub data: String,
}

/// Per-operation result alias at the registry boundary.
pub type RegResult<T> = std::result::Result<T, FailureKind>;

/// Read enumeration and write mutation against autostart roots.
///
/// Contract mirrors the OS registry API: `enum_values` walks value indices
/// `0, 1, 2, ...` until exhaustion; ordering is registry-defined and not
/// stable across calls. `delete_value` reports `NotFound` for an absent
/// value so the mutator can treat it as idempotent success.
pub trait RegistryProvider: Send + Sync {
    /// Enumerate every value under `root`.
    ///
    /// Errors: `Unavailable` when the root key does not exist,
    /// `AccessDenied` when it exists but cannot be opened for read.
    fn enum_values(&self, root: RootRef) -> RegResult<Vec<RawValue>>;

    /// Delete the value `name` under `root`.
    ///
    /// Errors: `NotFound` when the value is absent, `Unavailable` when the
    /// root key itself is absent, `AccessDenied` on insufficient privilege.
    fn delete_value(&self, root: RootRef, name: &str) -> RegResult<()>;
}

/// Resolve the live registry backend for this host.
pub fn detect_registry() -> Result<Arc<dyn RegistryProvider>> {
    #[cfg(windows)]
    {
        Ok(Arc::new(WindowsRegistry))
    }
    #[cfg(not(windows))]
    {
        Err(WmhError::UnsupportedPlatform {
            details: "live registry access requires Windows".to_string(),
        })
    }
}

// ──────────────────── Windows backend ────────────────────

/// Live backend over the `winreg` crate.
#[cfg(windows)]
#[derive(Debug, Default)]
pub struct WindowsRegistry;

#[cfg(windows)]
impl WindowsRegistry {
    fn open(root: RootRef, access: u32) -> RegResult<winreg::RegKey> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

        let hive = RegKey::predef(match root.hive {
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
            Hive::CurrentUser => HKEY_CURRENT_USER,
        });
        hive.open_subkey_with_flags(root.subkey, access)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => FailureKind::Unavailable,
                std::io::ErrorKind::PermissionDenied => FailureKind::AccessDenied,
                _ => FailureKind::Io,
            })
    }
}

#[cfg(windows)]
impl RegistryProvider for WindowsRegistry {
    fn enum_values(&self, root: RootRef) -> RegResult<Vec<RawValue>> {
        use winreg::enums::KEY_READ;

        let key = Self::open(root, KEY_READ)?;
        let mut values = Vec::new();
        // enum_values walks indices 0.. until the OS signals exhaustion;
        // individual unreadable values are skipped, not fatal.
        for entry in key.enum_values() {
            let Ok((name, data)) = entry else { continue };
            values.push(RawValue {
                name,
                data: data.to_string(),
            });
        }
        Ok(values)
    }

    fn delete_value(&self, root: RootRef, name: &str) -> RegResult<()> {
        use winreg::enums::KEY_SET_VALUE;

        let key = Self::open(root, KEY_SET_VALUE)?;
        key.delete_value(name).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => FailureKind::NotFound,
            std::io::ErrorKind::PermissionDenied => FailureKind::AccessDenied,
            _ => FailureKind::Io,
        })
    }
}

// ──────────────────── mock backend ────────────────────

#[derive(Debug, Default, Clone)]
struct MockRoot {
    values: Vec<RawValue>,
    deny_read: bool,
    deny_write: bool,
}

/// Deterministic in-memory registry for tests on any host.
///
/// Roots must be created explicitly: a root never added behaves like a
/// missing registry key (`Unavailable`), which is how the scanner's
/// skip-silently path is exercised.
#[derive(Debug, Default)]
pub struct MockRegistry {
    roots: RwLock<HashMap<(Hive, &'static str), MockRoot>>,
}

impl MockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `root` (empty) if it does not exist yet.
    pub fn add_root(&self, root: RootRef) {
        self.roots
            .write()
            .entry((root.hive, root.subkey))
            .or_default();
    }

    /// Create `root` if needed and set a value under it.
    pub fn set_value(&self, root: RootRef, name: &str, data: &str) {
        let mut roots = self.roots.write();
        let state = roots.entry((root.hive, root.subkey)).or_default();
        match state.values.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.data = data.to_string(),
            None => state.values.push(RawValue {
                name: name.to_string(),
                data: data.to_string(),
            }),
        }
    }

    /// Make read enumeration of `root` fail with `AccessDenied`.
    pub fn deny_read(&self, root: RootRef) {
        self.add_root(root);
        if let Some(state) = self.roots.write().get_mut(&(root.hive, root.subkey)) {
            state.deny_read = true;
        }
    }

    /// Make value deletion under `root` fail with `AccessDenied`.
    pub fn deny_write(&self, root: RootRef) {
        self.add_root(root);
        if let Some(state) = self.roots.write().get_mut(&(root.hive, root.subkey)) {
            state.deny_write = true;
        }
    }

    /// Whether `name` currently exists under `root`.
    #[must_use]
    pub fn contains_value(&self, root: RootRef, name: &str) -> bool {
        self.roots
            .read()
            .get(&(root.hive, root.subkey))
            .is_some_and(|state| state.values.iter().any(|v| v.name == name))
    }
}

impl RegistryProvider for MockRegistry {
    fn enum_values(&self, root: RootRef) -> RegResult<Vec<RawValue>> {
        let roots = self.roots.read();
        let Some(state) = roots.get(&(root.hive, root.subkey)) else {
            return Err(FailureKind::Unavailable);
        };
        if state.deny_read {
            return Err(FailureKind::AccessDenied);
        }
        Ok(state.values.clone())
    }

    fn delete_value(&self, root: RootRef, name: &str) -> RegResult<()> {
        let mut roots = self.roots.write();
        let Some(state) = roots.get_mut(&(root.hive, root.subkey)) else {
            return Err(FailureKind::Unavailable);
        };
        if state.deny_write {
            return Err(FailureKind::AccessDenied);
        }
        let before = state.values.len();
        state.values.retain(|v| v.name != name);
        if state.values.len() == before {
            return Err(FailureKind::NotFound);
        }
        Ok(())
    }
}
