//! Path converters for URL pattern matching.
//!
//! A converter decides which text a `<type:name>` placeholder matches, what
//! keyword-argument value the view receives for it, and how a value is
//! written back into a URL by `reverse`.
//!
//! | Name   | Regex                          | Keyword value   |
//! |--------|--------------------------------|-----------------|
//! | `int`  | `[0-9]+`                       | JSON number     |
//! | `str`  | `[^/]+`                        | JSON string     |
//! | `slug` | `[-a-zA-Z0-9_]+`               | JSON string     |
//! | `uuid` | `[0-9a-f]{8}-...-[0-9a-f]{12}` | JSON string     |
//! | `path` | `.+`                           | JSON string     |

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use fbv_core::{FbvError, FbvResult};

/// Converts between URL text and keyword-argument values.
pub trait PathConverter: Send + Sync + fmt::Debug {
    /// The regex (without anchors) a matching segment must satisfy.
    fn regex(&self) -> &'static str;

    /// Converts matched text into the value handed to the view.
    fn to_value(&self, raw: &str) -> FbvResult<Value>;

    /// Converts a value into URL text. The result must match [`regex`](Self::regex).
    fn to_url(&self, value: &Value) -> FbvResult<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(if *b { "True" } else { "False" }.to_string()),
            other => Err(FbvError::NoReverseMatch(format!(
                "cannot place {other} in a URL"
            ))),
        }
    }
}

/// Matches digits and hands the view an integer.
#[derive(Debug, Clone, Copy)]
pub struct IntConverter;

impl PathConverter for IntConverter {
    fn regex(&self) -> &'static str {
        "[0-9]+"
    }

    fn to_value(&self, raw: &str) -> FbvResult<Value> {
        raw.parse::<i64>()
            .map(Value::from)
            .map_err(|_| FbvError::BadRequest(format!("Invalid integer value: {raw}")))
    }
}

/// Matches any non-empty segment without `/`.
#[derive(Debug, Clone, Copy)]
pub struct StrConverter;

impl PathConverter for StrConverter {
    fn regex(&self) -> &'static str {
        "[^/]+"
    }

    fn to_value(&self, raw: &str) -> FbvResult<Value> {
        Ok(Value::from(raw))
    }
}

/// Matches ASCII letters, digits, hyphens and underscores.
#[derive(Debug, Clone, Copy)]
pub struct SlugConverter;

impl PathConverter for SlugConverter {
    fn regex(&self) -> &'static str {
        "[-a-zA-Z0-9_]+"
    }

    fn to_value(&self, raw: &str) -> FbvResult<Value> {
        Ok(Value::from(raw))
    }
}

/// Matches a lower-case hyphenated UUID.
#[derive(Debug, Clone, Copy)]
pub struct UuidConverter;

impl PathConverter for UuidConverter {
    fn regex(&self) -> &'static str {
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}"
    }

    fn to_value(&self, raw: &str) -> FbvResult<Value> {
        raw.parse::<uuid::Uuid>()
            .map(|u| Value::from(u.hyphenated().to_string()))
            .map_err(|_| FbvError::BadRequest(format!("Invalid UUID: {raw}")))
    }
}

/// Matches any non-empty text, slashes included.
#[derive(Debug, Clone, Copy)]
pub struct PathSegmentConverter;

impl PathConverter for PathSegmentConverter {
    fn regex(&self) -> &'static str {
        ".+"
    }

    fn to_value(&self, raw: &str) -> FbvResult<Value> {
        Ok(Value::from(raw))
    }
}

/// Returns the converter registered under `type_name`.
///
/// # Errors
///
/// [`FbvError::ImproperlyConfigured`] for an unknown type name.
pub fn get_converter(type_name: &str) -> FbvResult<Arc<dyn PathConverter>> {
    match type_name {
        "int" => Ok(Arc::new(IntConverter)),
        "str" => Ok(Arc::new(StrConverter)),
        "slug" => Ok(Arc::new(SlugConverter)),
        "uuid" => Ok(Arc::new(UuidConverter)),
        "path" => Ok(Arc::new(PathSegmentConverter)),
        _ => Err(FbvError::ImproperlyConfigured(format!(
            "Unknown path converter type: {type_name}"
        ))),
    }
}
