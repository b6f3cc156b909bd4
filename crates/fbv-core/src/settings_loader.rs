//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FBV_DEBUG` | `debug` |
//! | `FBV_LOG_LEVEL` | `log_level` |
//! | `FBV_BASE_DIR` | `base_dir` |
//! | `FBV_TEMPLATE_DIRS` | `templates[0].dirs` (comma-separated) |
//! | `FBV_JSON_ITEM_SEPARATOR` | `json.item_separator` |
//! | `FBV_JSON_KEY_SEPARATOR` | `json.key_separator` |
//! | `FBV_STATIC_MAX_AGE` | `static_max_age` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use fbv_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/settings.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::FbvError;
use crate::settings::{Settings, TemplateSettings};

/// Loads settings from a TOML string.
///
/// Keys missing from the TOML keep their default values, including keys of
/// nested tables such as `[json]`.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FbvError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FbvError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FbvError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FbvError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, FbvError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FbvError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FbvError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `FBV_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, std::env::vars());
}

/// Applies `FBV_*` overrides from an explicit list of variables.
///
/// Unknown keys are ignored, as are values that fail to parse.
pub fn apply_overrides<I, K, V>(settings: &mut Settings, vars: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    for (key, value) in vars {
        let value = value.into();
        match key.as_ref() {
            "FBV_DEBUG" => {
                settings.debug = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
            }
            "FBV_LOG_LEVEL" => settings.log_level = value,
            "FBV_BASE_DIR" => settings.base_dir = PathBuf::from(value),
            "FBV_TEMPLATE_DIRS" => {
                let dirs = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect();
                match settings.templates.first_mut() {
                    Some(templates) => templates.dirs = dirs,
                    None => settings.templates.push(TemplateSettings {
                        dirs,
                        ..TemplateSettings::default()
                    }),
                }
            }
            "FBV_JSON_ITEM_SEPARATOR" => settings.json.item_separator = value,
            "FBV_JSON_KEY_SEPARATOR" => settings.json.key_separator = value,
            "FBV_STATIC_MAX_AGE" => {
                if let Ok(max_age) = value.parse::<u64>() {
                    settings.static_max_age = max_age;
                }
            }
            _ => {}
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, FbvError> {
    std::fs::read_to_string(path).map_err(|e| {
        FbvError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, FbvError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FbvError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FbvError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
