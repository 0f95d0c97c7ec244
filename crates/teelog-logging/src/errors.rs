//! Logger error types.

use teelog_settings::SettingsError;
use thiserror::Error;

/// Errors from building or driving the logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory or file could not be created.
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    /// Settings failed to load or validate.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// `init` ran twice in this process.
    #[error("logger is already initialized")]
    AlreadyInitialized,
    /// A lifecycle call arrived before `init`.
    #[error("logger is not initialized")]
    NotInitialized,
}

/// Result type for logger operations.
pub type Result<T> = std::result::Result<T, LoggingError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn io_error_wraps_source() {
        let err: LoggingError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_matches!(err, LoggingError::Io(_));
        assert_eq!(err.to_string(), "failed to open log file: denied");
    }

    #[test]
    fn settings_error_is_transparent() {
        let err: LoggingError = SettingsError::InvalidValue("filename is empty".into()).into();
        assert_eq!(err.to_string(), "invalid settings value: filename is empty");
    }

    #[test]
    fn lifecycle_messages() {
        assert_eq!(
            LoggingError::AlreadyInitialized.to_string(),
            "logger is already initialized"
        );
        assert_eq!(LoggingError::NotInitialized.to_string(), "logger is not initialized");
    }
}
