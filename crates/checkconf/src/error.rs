//! Error types for check configuration reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering, staging or committing check
/// configuration, or while loading the desired-state manifest.
#[derive(Error, Debug)]
pub enum CheckConfError {
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON for '{path}': {source}")]
    SerializeJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML in '{path}': {message}")]
    ParseYaml { path: PathBuf, message: String },

    #[error("Invalid API version '{version}', expected '{expected}'")]
    InvalidApiVersion { version: String, expected: String },

    #[error("Duplicate resource name '{name}' for kind '{kind}'")]
    DuplicateName { kind: String, name: String },

    #[error("Invalid check name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Manifest directory not found: {0}")]
    ManifestDirNotFound(PathBuf),

    #[error("Check '{0}' is not bound to a desired resource")]
    NotBound(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl CheckConfError {
    /// Returns true if the failure came from filesystem I/O during commit.
    ///
    /// Retrying is only meaningful at whole-pass granularity: discovery must
    /// run again because earlier on-disk state may be stale.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckConfError::WriteFile { .. } | CheckConfError::RemoveFile { .. }
        )
    }
}

/// Result type for check configuration operations.
pub type Result<T> = std::result::Result<T, CheckConfError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn test_write_and_remove_failures_are_retryable() {
        let write = CheckConfError::WriteFile {
            path: PathBuf::from("/etc/sensu/conf.d/checks/config_ntp.json"),
            source: io_error(),
        };
        let remove = CheckConfError::RemoveFile {
            path: PathBuf::from("/etc/sensu/conf.d/checks/config_ntp.json"),
            source: io_error(),
        };
        assert!(write.is_retryable());
        assert!(remove.is_retryable());
    }

    #[test]
    fn test_read_and_validation_failures_are_not_retryable() {
        let read = CheckConfError::ReadFile {
            path: PathBuf::from("config_ntp.json"),
            source: io_error(),
        };
        assert!(!read.is_retryable());
        assert!(!CheckConfError::Validation("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_error_message_includes_path() {
        let err = CheckConfError::WriteFile {
            path: PathBuf::from("/tmp/foo/config_ntp.json"),
            source: io_error(),
        };
        assert!(err.to_string().contains("/tmp/foo/config_ntp.json"));
    }
}
