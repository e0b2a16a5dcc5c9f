//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ZonewatchSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply `ZONEWATCH_*` environment overrides
//! 4. Clamp anything out of range via [`ZonewatchSettings::validate`]
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use zonewatch_core::LogFormat;
use zonewatch_core::constants::{MAX_LOOKBACK_HOURS, MAX_TSS_DWELL_LIMIT_SECS};

use crate::errors::Result;
use crate::types::{ZonewatchSettings, zonewatch_dir};

/// Resolve the default settings file (`~/.zonewatch/settings.json`).
pub fn settings_path() -> PathBuf {
    zonewatch_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ZonewatchSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ZonewatchSettings> {
    let defaults = serde_json::to_value(ZonewatchSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ZonewatchSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `ZONEWATCH_*` environment overrides.
///
/// Invalid or out-of-range values are logged and ignored.
pub fn apply_env_overrides(settings: &mut ZonewatchSettings) {
    // ── Poll ────────────────────────────────────────────────────────
    if let Some(v) = read_env_u64("ZONEWATCH_POLL_INTERVAL_MS", 0, 3_600_000) {
        settings.poll.interval_ms = v;
    }
    if let Some(v) = read_env_u64("ZONEWATCH_ERROR_DELAY_MS", 0, 3_600_000) {
        settings.poll.error_delay_ms = v;
    }
    if let Some(v) = read_env_u64("ZONEWATCH_MAX_CYCLES", 1, u64::MAX) {
        settings.poll.max_cycles = Some(v);
    }

    // ── Commit / tracker / source ───────────────────────────────────
    if let Some(v) = read_env_usize("ZONEWATCH_CHUNK_SIZE", 1, 1_000_000) {
        settings.commit.chunk_size = v;
    }
    if let Some(v) = read_env_u64("ZONEWATCH_TSS_DWELL_LIMIT_SECS", 1, MAX_TSS_DWELL_LIMIT_SECS) {
        settings.tracker.tss_dwell_limit_secs = v;
    }
    if let Some(v) = read_env_u64("ZONEWATCH_LOOKBACK_HOURS", 1, MAX_LOOKBACK_HOURS) {
        settings.source.lookback_hours = v;
    }
    if let Some(v) = read_env_bool("ZONEWATCH_SCREEN_WITH_REGION") {
        settings.source.screen_with_region = v;
    }

    // ── Store ───────────────────────────────────────────────────────
    if let Some(v) = read_env_string("ZONEWATCH_DB_PATH") {
        settings.store.db_path = PathBuf::from(v);
    }
    if let Some(v) = read_env_u64("ZONEWATCH_POOL_SIZE", 1, 64) {
        settings.store.pool_size = v as u32;
    }
    if let Some(v) = read_env_u64("ZONEWATCH_BUSY_TIMEOUT_MS", 0, 600_000) {
        settings.store.busy_timeout_ms = v;
    }
    if let Some(v) = read_env_bool("ZONEWATCH_ENFORCE_OPEN_UNIQUENESS") {
        settings.store.enforce_open_uniqueness = v;
    }

    // ── Catalog / logging ───────────────────────────────────────────
    if let Some(v) = read_env_string("ZONEWATCH_CATALOG") {
        settings.catalog.path = PathBuf::from(v);
    }
    if let Some(v) = read_env_string("ZONEWATCH_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_string("ZONEWATCH_LOG_FORMAT") {
        match LogFormat::parse(&v) {
            Some(format) => settings.logging.format = format,
            None => tracing::warn!(value = %v, "invalid ZONEWATCH_LOG_FORMAT, ignoring"),
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a boolean: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a `usize` within an inclusive range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, min, max, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, min, max, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use assert_matches::assert_matches;

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"poll": {"intervalMs": 1000, "errorDelayMs": 1000}});
        let source = serde_json::json!({"poll": {"intervalMs": 250}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["poll"]["intervalMs"], 250);
        assert_eq!(merged["poll"]["errorDelayMs"], 1000);
    }

    #[test]
    fn merge_null_preserves_target() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"a": null}));
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let merged = deep_merge(
            serde_json::json!({"a": {"nested": true}}),
            serde_json::json!({"a": 42}),
        );
        assert_eq!(merged["a"], 42);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = load_settings_from_path(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings.commit.chunk_size, 300);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"commit": {"chunkSize": 25}, "store": {"dbPath": "/data/ais.db"}, "logging": {"format": "json"}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.commit.chunk_size, 25);
        assert_eq!(settings.store.db_path, PathBuf::from("/data/ais.db"));
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.poll.interval_ms, 1_000);
    }

    #[test]
    fn load_clamps_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"commit": {"chunkSize": 0}}"#).unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.commit.chunk_size, 1);
    }

    #[test]
    fn load_clamps_oversized_file_durations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"source": {"lookbackHours": 10000000000}, "tracker": {"tssDwellLimitSecs": 18446744073709551615}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.source.lookback_hours, MAX_LOOKBACK_HOURS);
        assert_eq!(settings.tracker.tss_dwell_limit_secs, MAX_TSS_DWELL_LIMIT_SECS);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert_matches!(err, SettingsError::Json(_));
    }

    #[test]
    fn load_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"poll": {"intervalMs": "soon"}}"#).unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert_matches!(err, SettingsError::Json(_));
    }

    #[test]
    fn parse_bool_variants() {
        for v in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["false", "0", "no", "Off"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("300", 1, 1000), Some(300));
        assert_eq!(parse_u64_range("1", 1, 1000), Some(1));
        assert_eq!(parse_u64_range("1000", 1, 1000), Some(1000));
        assert_eq!(parse_u64_range("0", 1, 1000), None);
        assert_eq!(parse_u64_range("1001", 1, 1000), None);
        assert_eq!(parse_u64_range("-5", 0, 10), None);
        assert_eq!(parse_u64_range("abc", 0, 10), None);
    }

    #[test]
    fn parse_usize_range_bounds() {
        assert_eq!(parse_usize_range(" 50 ", 1, 100), Some(50));
        assert_eq!(parse_usize_range("0", 1, 100), None);
    }
}
