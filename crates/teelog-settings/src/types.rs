//! Logger settings.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use teelog_core::LogLevel;

use crate::errors::{Result, SettingsError};

/// Default log directory.
pub const DEFAULT_DIR: &str = "/logs/app";
/// Default base file name (the timestamp and `.log` are appended).
pub const DEFAULT_FILENAME: &str = "app";
/// Buffer size that triggers an eager flush.
pub const DEFAULT_HIGH_WATER_MARK: usize = 64 * 1024;
/// Periodic flush interval.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 50;

/// Accepted `highWaterMark` values, in bytes.
pub const HIGH_WATER_MARK_RANGE: RangeInclusive<usize> = 1024..=64 * 1024 * 1024;
/// Accepted `flushIntervalMs` values.
pub const FLUSH_INTERVAL_MS_RANGE: RangeInclusive<u64> = 1..=60_000;

/// Everything needed to build the process logger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerSettings {
    /// Directory for log files. Created recursively if missing.
    pub dir: PathBuf,
    /// Base file name.
    pub filename: String,
    /// Minimum level written to the file.
    pub file_min_level: LogLevel,
    /// Minimum level written to stdout.
    pub console_min_level: LogLevel,
    /// Buffered bytes that trigger a flush request.
    pub high_water_mark: usize,
    /// Timer interval of the background flush.
    pub flush_interval_ms: u64,
    /// Route `tracing` events through the logger as well.
    pub capture_tracing: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DIR),
            filename: DEFAULT_FILENAME.to_string(),
            file_min_level: LogLevel::Debug,
            console_min_level: LogLevel::Error,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            capture_tracing: true,
        }
    }
}

impl LoggerSettings {
    /// Settings writing to `dir` with the given base name, defaults otherwise.
    pub fn in_dir(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Flush interval as a [`Duration`].
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Reject values the sink cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(SettingsError::InvalidValue("filename is empty".into()));
        }
        if !HIGH_WATER_MARK_RANGE.contains(&self.high_water_mark) {
            return Err(SettingsError::InvalidValue(format!(
                "highWaterMark {} is outside {HIGH_WATER_MARK_RANGE:?}",
                self.high_water_mark
            )));
        }
        if !FLUSH_INTERVAL_MS_RANGE.contains(&self.flush_interval_ms) {
            return Err(SettingsError::InvalidValue(format!(
                "flushIntervalMs {} is outside {FLUSH_INTERVAL_MS_RANGE:?}",
                self.flush_interval_ms
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = LoggerSettings::default();
        assert_eq!(s.dir, PathBuf::from("/logs/app"));
        assert_eq!(s.filename, "app");
        assert_eq!(s.file_min_level, LogLevel::Debug);
        assert_eq!(s.console_min_level, LogLevel::Error);
        assert_eq!(s.high_water_mark, 65_536);
        assert_eq!(s.flush_interval(), Duration::from_millis(50));
        assert!(s.capture_tracing);
        s.validate().unwrap();
    }

    #[test]
    fn camel_case_json() {
        let json = serde_json::to_value(LoggerSettings::default()).unwrap();
        assert_eq!(json["fileMinLevel"], "debug");
        assert_eq!(json["consoleMinLevel"], "error");
        assert_eq!(json["flushIntervalMs"], 50);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: LoggerSettings = serde_json::from_str(r#"{"filename":"svc"}"#).unwrap();
        assert_eq!(s.filename, "svc");
        assert_eq!(s.high_water_mark, DEFAULT_HIGH_WATER_MARK);
    }

    #[test]
    fn validate_rejects_empty_name() {
        let s = LoggerSettings::in_dir("/tmp", " ");
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_enforces_ranges_at_both_ends() {
        let mut s = LoggerSettings::in_dir("/tmp", "ok");
        let hwm_cases = [
            (0, false),
            (1023, false),
            (1024, true),
            (64 << 20, true),
            ((64 << 20) + 1, false),
        ];
        for (hwm, ok) in hwm_cases {
            s.high_water_mark = hwm;
            assert_eq!(s.validate().is_ok(), ok, "highWaterMark {hwm}");
        }
        s.high_water_mark = DEFAULT_HIGH_WATER_MARK;
        for (ms, ok) in [(0, false), (1, true), (60_000, true), (60_001, false)] {
            s.flush_interval_ms = ms;
            assert_eq!(s.validate().is_ok(), ok, "flushIntervalMs {ms}");
        }
    }
}
