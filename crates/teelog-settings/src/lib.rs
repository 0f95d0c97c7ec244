//! # teelog-settings
//!
//! Layered configuration for the teelog logger.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`LoggerSettings::default()`]
//! 2. **Settings file**: JSON named by `LOGGER_SETTINGS` (deep-merged over defaults)
//! 3. **Environment variables**: `LOGGER_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! let settings = teelog_settings::load_settings().unwrap_or_default();
//! println!("logging to {}", settings.dir.display());
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::LoggerSettings;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
