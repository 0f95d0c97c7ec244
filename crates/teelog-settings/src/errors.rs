//! Errors raised while building [`LoggerSettings`](crate::LoggerSettings).

use thiserror::Error;

/// Why logger settings could not be produced.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file named by `LOGGER_SETTINGS` exists but could not be read.
    #[error("cannot read logger settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON or has a wrongly typed key.
    #[error("malformed logger settings: {0}")]
    Json(#[from] serde_json::Error),
    /// A value parsed but is outside what the sink accepts.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::LoggerSettings;

    #[test]
    fn unreadable_file_names_the_settings() {
        let err: SettingsError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.to_string(), "cannot read logger settings file: denied");
    }

    #[test]
    fn wrongly_typed_key_is_malformed() {
        let err: SettingsError =
            serde_json::from_str::<LoggerSettings>(r#"{"captureTracing": "yes"}"#)
                .unwrap_err()
                .into();
        assert_matches!(err, SettingsError::Json(_));
        assert!(err.to_string().starts_with("malformed logger settings:"));
    }

    #[test]
    fn out_of_range_value_is_reported() {
        let mut settings = LoggerSettings::in_dir("/tmp", "svc");
        settings.flush_interval_ms = 0;
        let err = settings.validate().unwrap_err();
        assert_matches!(err, SettingsError::InvalidValue(ref msg) if msg.starts_with("flushIntervalMs 0"));
    }
}
