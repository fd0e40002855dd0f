//! Network diagnostics: active connections via an external collaborator.
//!
//! Same adapter shape as the software inventory: an opaque external command
//! (`netstat -ano` by default) whose tabular output is parsed with minimal
//! assumptions. Lines that do not fit are dropped; a failing command
//! degrades to an empty table with a diagnostic event, never an error.

#![allow(missing_docs)]

use std::process::Command;

use serde::Serialize;

use crate::core::config::NetConfig;
use crate::logger::{DiagEvent, DiagLoggerHandle};

/// One active connection as reported by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionEntry {
    pub proto: String,
    pub local_addr: String,
    pub remote_addr: String,
    /// Connection state (`LISTENING`, `ESTABLISHED`, ...). Empty for UDP,
    /// which is stateless and reported without a state column.
    pub state: String,
    /// Owning pid when the collaborator reports one.
    pub pid: Option<u32>,
}

/// Adapter owning the external command invocation.
pub struct NetAdapter {
    config: NetConfig,
    logger: Option<DiagLoggerHandle>,
}

impl NetAdapter {
    #[must_use]
    pub fn new(config: NetConfig, logger: Option<DiagLoggerHandle>) -> Self {
        Self { config, logger }
    }

    /// List active connections. Any failure degrades to an empty list with
    /// a diagnostic event; the caller never sees an error.
    #[must_use]
    pub fn list_connections(&self) -> Vec<ConnectionEntry> {
        let output = Command::new(&self.config.list_program)
            .args(&self.config.list_args)
            .output();

        let entries = match output {
            Ok(output) if output.status.success() => {
                parse_connections(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                self.log(DiagEvent::Warning {
                    message: format!(
                        "connection listing exited with {}; returning empty table",
                        output.status
                    ),
                });
                Vec::new()
            }
            Err(err) => {
                self.log(DiagEvent::Warning {
                    message: format!("connection listing failed to start: {err}"),
                });
                Vec::new()
            }
        };

        self.log(DiagEvent::ConnectionsFetched {
            count: entries.len(),
        });
        entries
    }

    fn log(&self, event: DiagEvent) {
        if let Some(logger) = &self.logger {
            logger.send(event);
        }
    }
}

/// Parse `netstat -ano`-style tabular output.
///
/// TCP rows carry five columns (`proto local remote state pid`), UDP rows
/// four (no state). Headers, banners, and anything else are skipped.
#[must_use]
pub fn parse_connections(raw: &str) -> Vec<ConnectionEntry> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&proto) = tokens.first() else {
            continue;
        };
        let entry = match (proto.to_ascii_uppercase().as_str(), tokens.len()) {
            ("TCP" | "TCP6", 5..) => ConnectionEntry {
                proto: proto.to_ascii_uppercase(),
                local_addr: tokens[1].to_string(),
                remote_addr: tokens[2].to_string(),
                state: tokens[3].to_string(),
                pid: tokens[4].parse().ok(),
            },
            ("UDP" | "UDP6", 4..) => ConnectionEntry {
                proto: proto.to_ascii_uppercase(),
                local_addr: tokens[1].to_string(),
                remote_addr: tokens[2].to_string(),
                state: String::new(),
                pid: tokens[3].parse().ok(),
            },
            _ => continue,
        };
        entries.push(entry);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\

Active Connections

  Proto  Local Address          Foreign Address        State           PID
  TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       948
  TCP    127.0.0.1:49664        127.0.0.1:50122        ESTABLISHED     4
  UDP    0.0.0.0:123            *:*                                    1096
";

    #[test]
    fn parses_tcp_rows_with_state_and_pid() {
        let entries = parse_connections(SAMPLE);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].proto, "TCP");
        assert_eq!(entries[0].local_addr, "0.0.0.0:135");
        assert_eq!(entries[0].state, "LISTENING");
        assert_eq!(entries[0].pid, Some(948));
    }

    #[test]
    fn udp_rows_have_no_state() {
        let entries = parse_connections(SAMPLE);
        assert_eq!(entries[2].proto, "UDP");
        assert_eq!(entries[2].remote_addr, "*:*");
        assert_eq!(entries[2].state, "");
        assert_eq!(entries[2].pid, Some(1096));
    }

    #[test]
    fn headers_and_banners_are_skipped() {
        let entries = parse_connections("Active Connections\n  Proto Local\n");
        assert!(entries.is_empty());
    }

    #[test]
    fn unparseable_pid_degrades_to_none() {
        let entries = parse_connections("TCP 1.2.3.4:80 5.6.7.8:443 ESTABLISHED forty-two");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pid, None);
    }

    #[test]
    fn garbage_input_yields_empty_not_panic() {
        assert!(parse_connections("").is_empty());
        assert!(parse_connections("completely unrelated text\n-    -\n").is_empty());
    }

    #[test]
    fn missing_command_degrades_to_empty() {
        let config = NetConfig {
            list_program: "wmh-test-no-such-binary".to_string(),
            list_args: Vec::new(),
        };
        let adapter = NetAdapter::new(config, None);
        assert!(adapter.list_connections().is_empty());
    }
}
