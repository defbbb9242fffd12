//! Configuration errors.

use dyouth_auth::GateError;
use dyouth_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid environment variable value.
    #[error("invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    /// The `[gate]` section describes an unsafe gate.
    #[error("invalid gate configuration: {0}")]
    Gate(#[from] GateError),
}

impl ConfigError {
    /// Creates a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse TOML error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid env var error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ_FILE",
            Self::ParseToml { .. } => "CONFIG_PARSE_TOML",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
            Self::Gate(_) => "CONFIG_GATE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyouth_types::assert_error_code;

    #[test]
    fn error_display() {
        let err = ConfigError::invalid_env_var("DYOUTH_DEBUG", "expected bool");
        assert!(err.to_string().contains("DYOUTH_DEBUG"));
        assert!(err.to_string().contains("expected bool"));
        assert_error_code(&err, "CONFIG_");
    }

    #[test]
    fn gate_error_converts() {
        let err: ConfigError = GateError::SetupRequiresProfile {
            path: "/setup-profile".into(),
        }
        .into();
        assert_eq!(err.code(), "CONFIG_GATE");
        assert!(err.to_string().contains("/setup-profile"));
    }
}
