//! JSON encoding with configurable separators.
//!
//! [`JsonEncoder`] writes JSON through a [`serde_json::ser::Formatter`] that
//! places [`Separators`] between items and between keys and values, and
//! optionally escapes every character outside printable ASCII as `\uXXXX`.
//!
//! # Examples
//!
//! ```
//! use fbv_http::json::{JsonEncoder, Separators};
//!
//! let data = serde_json::json!({"test": [1, 2]});
//! assert_eq!(JsonEncoder::default().encode(&data).unwrap(), r#"{"test":[1,2]}"#);
//!
//! let spaced = JsonEncoder::new(Separators::spaced(), true);
//! assert_eq!(spaced.encode(&data).unwrap(), r#"{"test": [1, 2]}"#);
//! ```

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use fbv_core::{FbvError, FbvResult, JsonSettings};

/// The pair of strings written between JSON items and between keys and values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
    /// Written between array items and between object members.
    pub item: String,
    /// Written between an object key and its value.
    pub key: String,
}

impl Separators {
    /// Creates a separator pair.
    pub fn new(item: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            key: key.into(),
        }
    }

    /// `","` and `":"`.
    pub fn minified() -> Self {
        let (item, key) = JsonSettings::MINIFIED_SEPARATORS;
        Self::new(item, key)
    }

    /// `", "` and `": "`.
    pub fn spaced() -> Self {
        let (item, key) = JsonSettings::DEFAULT_SEPARATORS;
        Self::new(item, key)
    }

    /// The separators configured in `settings`.
    pub fn from_settings(settings: &JsonSettings) -> Self {
        Self::new(settings.item_separator.as_str(), settings.key_separator.as_str())
    }
}

impl Default for Separators {
    fn default() -> Self {
        Self::minified()
    }
}

impl From<(&str, &str)> for Separators {
    fn from((item, key): (&str, &str)) -> Self {
        Self::new(item, key)
    }
}

/// Encodes values as JSON text with fixed separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonEncoder {
    separators: Separators,
    ensure_ascii: bool,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new(Separators::default(), true)
    }
}

impl JsonEncoder {
    /// Creates an encoder.
    pub const fn new(separators: Separators, ensure_ascii: bool) -> Self {
        Self {
            separators,
            ensure_ascii,
        }
    }

    /// Creates an encoder from [`JsonSettings`].
    pub fn from_settings(settings: &JsonSettings) -> Self {
        Self::new(Separators::from_settings(settings), settings.ensure_ascii)
    }

    /// The separators in use.
    pub const fn separators(&self) -> &Separators {
        &self.separators
    }

    /// Whether non-ASCII characters are escaped.
    pub const fn ensure_ascii(&self) -> bool {
        self.ensure_ascii
    }

    /// Encodes `value` to a JSON string.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> FbvResult<String> {
        let mut out = Vec::with_capacity(128);
        let formatter = SeparatorFormatter {
            separators: &self.separators,
            ensure_ascii: self.ensure_ascii,
        };
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| FbvError::SerializationError(e.to_string()))?;
        String::from_utf8(out).map_err(|e| FbvError::SerializationError(e.to_string()))
    }
}

struct SeparatorFormatter<'a> {
    separators: &'a Separators,
    ensure_ascii: bool,
}

impl Formatter for SeparatorFormatter<'_> {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(self.separators.item.as_bytes())
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(self.separators.item.as_bytes())
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.separators.key.as_bytes())
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if !self.ensure_ascii {
            return writer.write_all(fragment.as_bytes());
        }

        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0_u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
