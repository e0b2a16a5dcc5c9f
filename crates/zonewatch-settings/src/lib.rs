//! # zonewatch-settings
//!
//! Configuration for the zonewatch residency tracker.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** from [`ZonewatchSettings::default()`]
//! 2. **User file** at `~/.zonewatch/settings.json`, deep-merged over defaults
//! 3. **Environment variables** named `ZONEWATCH_*` (highest priority)
//!
//! Out-of-range values are clamped by [`ZonewatchSettings::validate`].

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
