//! Settings for fbv-rs.
//!
//! [`Settings`] holds everything the application, template engine, JSON views
//! and file views need. There is no global instance: settings are built once
//! at startup and handed to the components that read them.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Template engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSettings {
    /// Directories to search for template files, in priority order.
    pub dirs: Vec<PathBuf>,
    /// Whether HTML autoescaping is enabled for `.html`, `.htm` and `.xml`
    /// templates.
    pub autoescape: bool,
    /// Names of the context processors to run before every render
    /// (`"request"` and `"debug"` are built in).
    pub context_processors: Vec<String>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            dirs: vec![PathBuf::from("templates")],
            autoescape: true,
            context_processors: vec!["request".to_string()],
        }
    }
}

/// Defaults for JSON responses produced by JSON views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSettings {
    /// Written between array items and object members.
    pub item_separator: String,
    /// Written between an object key and its value.
    pub key_separator: String,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ensure_ascii: bool,
}

impl JsonSettings {
    /// The minified pair: `","` and `":"`.
    pub const MINIFIED_SEPARATORS: (&'static str, &'static str) = (",", ":");

    /// The spaced pair: `", "` and `": "`.
    pub const DEFAULT_SEPARATORS: (&'static str, &'static str) = (", ", ": ");
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            item_separator: Self::MINIFIED_SEPARATORS.0.to_string(),
            key_separator: Self::MINIFIED_SEPARATORS.1.to_string(),
            ensure_ascii: true,
        }
    }
}

/// The complete set of fbv-rs settings.
///
/// # Examples
///
/// ```
/// use fbv_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.json.item_separator, ",");
/// assert_eq!(settings.static_max_age, 86_400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// Root directory that file-serving views resolve `file_path` against.
    pub base_dir: PathBuf,

    // ── Templates ────────────────────────────────────────────────────

    /// Template engine configurations. The first one is used.
    pub templates: Vec<TemplateSettings>,

    // ── Responses ────────────────────────────────────────────────────

    /// Defaults for JSON views.
    pub json: JsonSettings,
    /// `max-age` in seconds sent with file and favicon responses.
    pub static_max_age: u64,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "debug", "fbv_views=trace").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            base_dir: PathBuf::from("."),
            templates: vec![TemplateSettings::default()],
            json: JsonSettings::default(),
            static_max_age: 60 * 60 * 24,
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

impl Settings {
    /// Returns the template configuration in use, falling back to the
    /// default when none is configured.
    pub fn template_settings(&self) -> TemplateSettings {
        self.templates.first().cloned().unwrap_or_default()
    }
}
