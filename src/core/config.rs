//! Configuration system: TOML file + smart defaults.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, WmhError};

/// Full WMH configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub startup: StartupConfig,
    pub procs: ProcsConfig,
    pub sweeper: SweeperConfig,
    pub inventory: InventoryConfig,
    pub net: NetConfig,
    pub logging: LoggingConfig,
}

/// Startup-entry management knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StartupConfig {
    /// Criticality policy: entry name -> protected flag. A name absent from
    /// the table is treated as not critical (eligible for user review).
    pub critical: BTreeMap<String, bool>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        let mut critical = BTreeMap::new();
        critical.insert("Windows Security Notification".to_string(), true);
        critical.insert("OneDrive".to_string(), true);
        critical.insert("Microsoft Teams".to_string(), false);
        Self { critical }
    }
}

/// Process listing knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcsConfig {
    /// Default number of ranked processes shown by `wmh ps`.
    pub top_k: usize,
}

impl Default for ProcsConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Temp-sweeper directories and walk limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SweeperConfig {
    pub temp_dirs: Vec<PathBuf>,
    pub max_depth: usize,
    pub parallelism: usize,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            temp_dirs: default_temp_dirs(),
            max_depth: 16,
            parallelism: 4,
        }
    }
}

/// External software-inventory collaborator invocation.
///
/// The core never depends on the exact tool; both commands are plain
/// program+args so operators can swap the collaborator out. The uninstall
/// args may contain a `{name}` placeholder replaced with the exact app name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InventoryConfig {
    pub list_program: String,
    pub list_args: Vec<String>,
    pub uninstall_program: String,
    pub uninstall_args: Vec<String>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            list_program: "powershell".to_string(),
            list_args: vec![
                "-Command".to_string(),
                "Get-WmiObject -Class Win32_Product | Select-Object Name,Version,InstallDate"
                    .to_string(),
            ],
            uninstall_program: "powershell".to_string(),
            uninstall_args: vec![
                "-Command".to_string(),
                "(Get-WmiObject -Class Win32_Product -Filter \"Name='{name}'\").Uninstall()"
                    .to_string(),
            ],
        }
    }
}

/// External connection-listing collaborator invocation.
///
/// Same shape as [`InventoryConfig`]: a plain program+args pair so the core
/// never hard-codes the tool behind the connection table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetConfig {
    pub list_program: String,
    pub list_args: Vec<String>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            list_program: "netstat".to_string(),
            list_args: vec!["-ano".to_string()],
        }
    }
}

/// Diagnostic log destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only JSONL diagnostic log. Write-only; never read back.
    pub jsonl_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            jsonl_path: PathBuf::from("system_maintenance.jsonl"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WmhError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| WmhError::io(path, source))?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| WmhError::Serialization {
            context: "toml",
            details: err.to_string(),
        })
    }

    /// Reject configurations that would make batch pipelines degenerate.
    pub fn validate(&self) -> Result<()> {
        if self.sweeper.temp_dirs.is_empty() {
            return Err(WmhError::InvalidConfig {
                details: "sweeper.temp_dirs must name at least one directory".to_string(),
            });
        }
        if self.sweeper.parallelism == 0 {
            return Err(WmhError::InvalidConfig {
                details: "sweeper.parallelism must be at least 1".to_string(),
            });
        }
        if self.sweeper.max_depth == 0 {
            return Err(WmhError::InvalidConfig {
                details: "sweeper.max_depth must be at least 1".to_string(),
            });
        }
        if self.procs.top_k == 0 {
            return Err(WmhError::InvalidConfig {
                details: "procs.top_k must be at least 1".to_string(),
            });
        }
        if self.inventory.list_program.is_empty() || self.inventory.uninstall_program.is_empty() {
            return Err(WmhError::InvalidConfig {
                details: "inventory commands must not be empty".to_string(),
            });
        }
        if self.net.list_program.is_empty() {
            return Err(WmhError::InvalidConfig {
                details: "net.list_program must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// The fixed candidate temp locations WinDiag sweeps, resolved from the
/// environment. A directory that does not exist is skipped at walk time,
/// so listing an absent location here is harmless.
fn default_temp_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(tmp) = env::var("TEMP")
        && !tmp.is_empty()
    {
        dirs.push(PathBuf::from(tmp));
    }
    if let Ok(local) = env::var("LOCALAPPDATA")
        && !local.is_empty()
    {
        dirs.push(Path::new(&local).join("Temp"));
    }
    dirs.push(PathBuf::from("C:\\Windows\\Temp"));
    if cfg!(not(windows)) {
        dirs.push(env::temp_dir());
    }
    dirs.sort();
    dirs.dedup();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().expect("defaults must validate");
    }

    #[test]
    fn default_policy_seeds_windiag_table() {
        let config = Config::default();
        assert_eq!(config.startup.critical.get("OneDrive"), Some(&true));
        assert_eq!(config.startup.critical.get("Microsoft Teams"), Some(&false));
        assert_eq!(config.startup.critical.get("Unknown App"), None);
    }

    #[test]
    fn load_missing_file_reports_missing_config() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert_eq!(err.code(), "WMH-1002");
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wmh.toml");
        let mut config = Config::default();
        config.procs.top_k = 12;
        config.sweeper.parallelism = 2;
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wmh.toml");
        fs::write(&path, "[procs]\ntop_k = 3\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.procs.top_k, 3);
        assert_eq!(loaded.sweeper.max_depth, 16);
        assert!(!loaded.startup.critical.is_empty());
    }

    #[test]
    fn rejects_zero_parallelism() {
        let mut config = Config::default();
        config.sweeper.parallelism = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "WMH-1001");
    }

    #[test]
    fn rejects_empty_temp_dirs() {
        let mut config = Config::default();
        config.sweeper.temp_dirs.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_net_command() {
        let mut config = Config::default();
        assert_eq!(config.net.list_program, "netstat");
        config.net.list_program.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "WMH-1001");
    }

    #[test]
    fn default_temp_dirs_include_windows_temp() {
        let dirs = default_temp_dirs();
        assert!(dirs.iter().any(|d| d == Path::new("C:\\Windows\\Temp")));
    }
}
