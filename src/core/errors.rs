//! WMH-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, WmhError>;

/// Top-level error type for the Windows Maintenance Helper.
#[derive(Debug, Error)]
pub enum WmhError {
    #[error("[WMH-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[WMH-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[WMH-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[WMH-1101] unsupported platform: {details}")]
    UnsupportedPlatform { details: String },

    #[error("[WMH-2001] registry failure for {root}: {details}")]
    Registry { root: String, details: String },

    #[error("[WMH-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[WMH-2201] external command `{program}` failed: {details}")]
    ExternalCommand { program: String, details: String },

    #[error("[WMH-3001] access denied for {target}")]
    AccessDenied { target: String },

    #[error("[WMH-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[WMH-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[WMH-3004] target not found: {target}")]
    NotFound { target: String },

    #[error("[WMH-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl WmhError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "WMH-1001",
            Self::MissingConfig { .. } => "WMH-1002",
            Self::ConfigParse { .. } => "WMH-1003",
            Self::UnsupportedPlatform { .. } => "WMH-1101",
            Self::Registry { .. } => "WMH-2001",
            Self::Serialization { .. } => "WMH-2101",
            Self::ExternalCommand { .. } => "WMH-2201",
            Self::AccessDenied { .. } => "WMH-3001",
            Self::Io { .. } => "WMH-3002",
            Self::ChannelClosed { .. } => "WMH-3003",
            Self::NotFound { .. } => "WMH-3004",
            Self::Runtime { .. } => "WMH-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// Denied actions are deliberately non-retryable: a denied mutation needs
    /// a new explicit user attempt (e.g. elevated), not an automatic loop.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::ExternalCommand { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for WmhError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for WmhError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_errors() -> Vec<WmhError> {
        vec![
            WmhError::InvalidConfig {
                details: String::new(),
            },
            WmhError::MissingConfig {
                path: PathBuf::new(),
            },
            WmhError::ConfigParse {
                context: "",
                details: String::new(),
            },
            WmhError::UnsupportedPlatform {
                details: String::new(),
            },
            WmhError::Registry {
                root: String::new(),
                details: String::new(),
            },
            WmhError::Serialization {
                context: "",
                details: String::new(),
            },
            WmhError::ExternalCommand {
                program: String::new(),
                details: String::new(),
            },
            WmhError::AccessDenied {
                target: String::new(),
            },
            WmhError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            WmhError::ChannelClosed { component: "" },
            WmhError::NotFound {
                target: String::new(),
            },
            WmhError::Runtime {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = sample_errors();
        let codes: Vec<&str> = errors.iter().map(WmhError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_wmh_prefix() {
        for err in &sample_errors() {
            assert!(
                err.code().starts_with("WMH-"),
                "code {} must start with WMH-",
                err.code()
            );
        }
    }

    #[test]
    fn error_display_includes_code() {
        let err = WmhError::InvalidConfig {
            details: "bad value".to_string(),
        };
        let msg = err.to_string();
        assert!(
            msg.contains("WMH-1001"),
            "display should contain error code: {msg}"
        );
        assert!(
            msg.contains("bad value"),
            "display should contain details: {msg}"
        );
    }

    #[test]
    fn denied_actions_are_not_retryable() {
        assert!(
            !WmhError::AccessDenied {
                target: "HKLM\\...\\Run".to_string()
            }
            .is_retryable()
        );
        assert!(
            !WmhError::NotFound {
                target: "pid 42".to_string()
            }
            .is_retryable()
        );
        assert!(
            WmhError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            }
            .is_retryable()
        );
    }

    #[test]
    fn io_convenience_constructor() {
        let err = WmhError::io(
            "C:\\Windows\\Temp\\test.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "WMH-3002");
        assert!(err.to_string().contains("test.txt"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: WmhError = json_err.into();
        assert_eq!(err.code(), "WMH-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: WmhError = toml_err.into();
        assert_eq!(err.code(), "WMH-1003");
    }
}
