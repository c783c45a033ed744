//! SFM-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SfmError>;

/// Top-level error type for Sim Fleet Monitor.
#[derive(Debug, Error)]
pub enum SfmError {
    #[error("[SFM-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SFM-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SFM-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SFM-2001] terminal failure: {source}")]
    Terminal {
        #[from]
        source: std::io::Error,
    },

    #[error("[SFM-2002] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SFM-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SFM-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SfmError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SFM-1001",
            Self::MissingConfig { .. } => "SFM-1002",
            Self::ConfigParse { .. } => "SFM-1003",
            Self::Terminal { .. } => "SFM-2001",
            Self::ChannelClosed { .. } => "SFM-2002",
            Self::Io { .. } => "SFM-3001",
            Self::Runtime { .. } => "SFM-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// Only I/O qualifies: a draw can fail transiently during a resize race
    /// and a file read can race a concurrent writer. Everything else is
    /// either a config problem the operator must fix or an unrecoverable
    /// channel/runtime condition.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Terminal { .. } | Self::Io { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for runtime failures with formatted details.
    #[must_use]
    pub fn runtime(details: impl Into<String>) -> Self {
        Self::Runtime {
            details: details.into(),
        }
    }
}

impl From<toml::de::Error> for SfmError {
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

    #[test]
    fn error_codes_are_unique() {
        let errors: Vec<SfmError> = vec![
            SfmError::InvalidConfig {
                details: String::new(),
            },
            SfmError::MissingConfig {
                path: PathBuf::new(),
            },
            SfmError::ConfigParse {
                context: "",
                details: String::new(),
            },
            SfmError::Terminal {
                source: std::io::Error::other("test"),
            },
            SfmError::ChannelClosed { component: "" },
            SfmError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            SfmError::Runtime {
                details: String::new(),
            },
        ];

        let codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn error_codes_have_sfm_prefix() {
        let errors: Vec<SfmError> = vec![
            SfmError::InvalidConfig {
                details: String::new(),
            },
            SfmError::Runtime {
                details: String::new(),
            },
            SfmError::Terminal {
                source: std::io::Error::other("test"),
            },
        ];

        for err in &errors {
            assert!(
                err.code().starts_with("SFM-"),
                "code {} must start with SFM-",
                err.code()
            );
        }
    }

    #[test]
    fn error_display_includes_code() {
        let err = SfmError::InvalidConfig {
            details: "bad value".to_string(),
        };
        let msg = err.to_string();
        assert!(
            msg.contains("SFM-1001"),
            "display should contain error code: {msg}"
        );
        assert!(
            msg.contains("bad value"),
            "display should contain details: {msg}"
        );
    }

    #[test]
    fn retryable_errors_are_correct() {
        // Retryable.
        assert!(
            SfmError::Terminal {
                source: std::io::Error::other("test"),
            }
            .is_retryable()
        );
        assert!(
            SfmError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            }
            .is_retryable()
        );

        // Not retryable.
        assert!(
            !SfmError::InvalidConfig {
                details: String::new()
            }
            .is_retryable()
        );
        assert!(
            !SfmError::MissingConfig {
                path: PathBuf::new()
            }
            .is_retryable()
        );
        assert!(!SfmError::ChannelClosed { component: "bus" }.is_retryable());
        assert!(
            !SfmError::Runtime {
                details: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn runtime_convenience_constructor() {
        let err = SfmError::runtime("thread spawn failed");
        assert_eq!(err.code(), "SFM-3900");
        assert!(err.to_string().contains("thread spawn failed"));
    }

    #[test]
    fn io_convenience_constructor() {
        let err = SfmError::io(
            "/tmp/config.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code(), "SFM-3001");
        assert!(err.to_string().contains("/tmp/config.toml"));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no tty");
        let err: SfmError = io_err.into();
        assert_eq!(err.code(), "SFM-2001");
        assert!(err.to_string().contains("no tty"));
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: SfmError = toml_err.into();
        assert_eq!(err.code(), "SFM-1003");
    }
}
