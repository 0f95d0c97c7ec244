//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LoggerSettings::default()`]
//! 2. If `LOGGER_SETTINGS` names a JSON file, deep-merge it over defaults
//! 3. Apply `LOGGER_*` environment overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use teelog_core::LogLevel;
use tracing::debug;

use crate::errors::Result;
use crate::types::{FLUSH_INTERVAL_MS_RANGE, HIGH_WATER_MARK_RANGE, LoggerSettings};

/// Names a JSON settings file.
pub const ENV_SETTINGS: &str = "LOGGER_SETTINGS";
/// Overrides [`LoggerSettings::dir`].
pub const ENV_DIR: &str = "LOGGER_DIR";
/// Overrides [`LoggerSettings::filename`].
pub const ENV_FILENAME: &str = "LOGGER_FILENAME";
/// Overrides [`LoggerSettings::file_min_level`].
pub const ENV_FILE_MIN_LEVEL: &str = "LOGGER_FILE_MIN_LEVEL";
/// Overrides [`LoggerSettings::console_min_level`].
pub const ENV_CONSOLE_MIN_LEVEL: &str = "LOGGER_CONSOLE_MIN_LEVEL";
/// Overrides [`LoggerSettings::high_water_mark`].
pub const ENV_HIGH_WATER_MARK: &str = "LOGGER_HIGH_WATER_MARK";
/// Overrides [`LoggerSettings::flush_interval_ms`].
pub const ENV_FLUSH_INTERVAL_MS: &str = "LOGGER_FLUSH_INTERVAL_MS";
/// Overrides [`LoggerSettings::capture_tracing`].
pub const ENV_CAPTURE_TRACING: &str = "LOGGER_CAPTURE_TRACING";

/// Path of the JSON settings file, if `LOGGER_SETTINGS` is set.
pub fn settings_path() -> Option<PathBuf> {
    read_env_string(ENV_SETTINGS).map(PathBuf::from)
}

/// Load settings from the `LOGGER_SETTINGS` file (if any) with env var overrides.
pub fn load_settings() -> Result<LoggerSettings> {
    match settings_path() {
        Some(path) => load_settings_from_path(&path),
        None => {
            let mut settings = LoggerSettings::default();
            apply_env_overrides(&mut settings);
            settings.validate()?;
            Ok(settings)
        }
    }
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LoggerSettings> {
    let mut settings = merge_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults with the file at `path` merged over them, no env overrides.
pub fn merge_file(path: &Path) -> Result<LoggerSettings> {
    let defaults = serde_json::to_value(LoggerSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading logger settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "logger settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Overlay a parsed settings file onto the serialized defaults.
///
/// Keys present in `overlay` win; `null` keeps the default so a file can
/// spell out a key without changing it. Nested objects are overlaid key by
/// key, anything else is replaced whole.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(layer)) => {
            for (key, value) in layer.into_iter().filter(|(_, v)| !v.is_null()) {
                let slot = merged.entry(key).or_insert(Value::Null);
                *slot = deep_merge(slot.take(), value);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Apply environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut LoggerSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides looked up through `lookup`.
///
/// Empty values are ignored. Levels parse lossily (unknown → `info`);
/// out-of-range numbers and unparseable booleans are ignored with a warning.
pub fn apply_overrides<F>(settings: &mut LoggerSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_DIR) {
        settings.dir = PathBuf::from(v);
    }
    if let Some(v) = get(ENV_FILENAME) {
        settings.filename = v;
    }
    if let Some(v) = get(ENV_FILE_MIN_LEVEL) {
        settings.file_min_level = LogLevel::from_str_lossy(&v);
    }
    if let Some(v) = get(ENV_CONSOLE_MIN_LEVEL) {
        settings.console_min_level = LogLevel::from_str_lossy(&v);
    }
    if let Some(v) = get(ENV_HIGH_WATER_MARK) {
        match parse_usize_range(
            &v,
            *HIGH_WATER_MARK_RANGE.start(),
            *HIGH_WATER_MARK_RANGE.end(),
        ) {
            Some(n) => settings.high_water_mark = n,
            None => warn_ignored(ENV_HIGH_WATER_MARK, &v),
        }
    }
    if let Some(v) = get(ENV_FLUSH_INTERVAL_MS) {
        match parse_u64_range(
            &v,
            *FLUSH_INTERVAL_MS_RANGE.start(),
            *FLUSH_INTERVAL_MS_RANGE.end(),
        ) {
            Some(n) => settings.flush_interval_ms = n,
            None => warn_ignored(ENV_FLUSH_INTERVAL_MS, &v),
        }
    }
    if let Some(v) = get(ENV_CAPTURE_TRACING) {
        match parse_bool(&v) {
            Some(b) => settings.capture_tracing = b,
            None => warn_ignored(ENV_CAPTURE_TRACING, &v),
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn warn_ignored(key: &str, value: &str) {
    tracing::warn!(key, value, "invalid logger env var, ignoring");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
