//! Software-inventory collaborator: an opaque external command wrapped in a
//! narrow adapter.
//!
//! The collaborator prints tabular text with columns `Name Version
//! InstallDate`. The contract is fragile by nature, so the parser assumes
//! only that fields are whitespace-delimited with the last two tokens being
//! version and install date; anything that deviates degrades to an empty or
//! partial result instead of failing the caller.

#![allow(missing_docs)]

use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::core::config::InventoryConfig;
use crate::core::errors::{Result, WmhError};
use crate::logger::{DiagEvent, DiagLoggerHandle};

/// One installed program as reported by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareEntry {
    pub name: String,
    pub version: String,
    pub install_date: String,
}

/// Adapter owning the external command invocations.
pub struct InventoryAdapter {
    config: InventoryConfig,
    logger: Option<DiagLoggerHandle>,
}

impl InventoryAdapter {
    #[must_use]
    pub fn new(config: InventoryConfig, logger: Option<DiagLoggerHandle>) -> Self {
        Self { config, logger }
    }

    /// List installed software. Any failure — the command missing, a
    /// non-zero exit, undecodable output — degrades to an empty list with a
    /// diagnostic event; the caller never sees an error.
    #[must_use]
    pub fn list_installed(&self) -> Vec<SoftwareEntry> {
        let output = Command::new(&self.config.list_program)
            .args(&self.config.list_args)
            .output();

        let entries = match output {
            Ok(output) if output.status.success() => {
                parse_inventory(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                self.log(DiagEvent::Warning {
                    message: format!(
                        "inventory command exited with {}; returning empty list",
                        output.status
                    ),
                });
                Vec::new()
            }
            Err(err) => {
                self.log(DiagEvent::Warning {
                    message: format!("inventory command failed to start: {err}"),
                });
                Vec::new()
            }
        };

        self.log(DiagEvent::InventoryFetched {
            count: entries.len(),
        });
        entries
    }

    /// Fire-and-forget uninstall keyed by exact name match.
    pub fn uninstall(&self, name: &str) -> Result<()> {
        let args: Vec<String> = self
            .config
            .uninstall_args
            .iter()
            .map(|arg| arg.replace("{name}", name))
            .collect();

        let status = Command::new(&self.config.uninstall_program)
            .args(&args)
            .status()
            .map_err(|err| WmhError::ExternalCommand {
                program: self.config.uninstall_program.clone(),
                details: err.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(WmhError::ExternalCommand {
                program: self.config.uninstall_program.clone(),
                details: format!("uninstall of `{name}` exited with {status}"),
            })
        }
    }

    fn log(&self, event: DiagEvent) {
        if let Some(logger) = &self.logger {
            logger.send(event);
        }
    }
}

/// Parse the collaborator's tabular output.
///
/// Header lines (anything containing `Name`), separator rows, and blank
/// lines are skipped. A data line needs at least three tokens: the last two
/// are version and install date, everything before them is the name. Lines
/// that do not fit are dropped, not fatal.
#[must_use]
pub fn parse_inventory(raw: &str) -> Vec<SoftwareEntry> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains("Name") || line.starts_with('-') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            continue;
        }
        let (name_tokens, tail) = tokens.split_at(tokens.len() - 2);
        entries.push(SoftwareEntry {
            name: name_tokens.join(" "),
            version: tail[0].to_string(),
            install_date: tail[1].to_string(),
        });
    }
    entries
}
