//! Template context.
//!
//! A [`Context`] is an ordered mapping from variable names to JSON values.
//! Views build one and return it; the render decorator hands it to the
//! template engine.

use serde_json::{Map, Value};

/// The variables available to a template, in insertion order.
///
/// # Examples
///
/// ```
/// use fbv_template::Context;
///
/// let mut ctx = Context::new();
/// ctx.insert("test", 123);
/// ctx.insert("name", "fbv");
/// assert_eq!(ctx.get("test"), Some(&serde_json::json!(123)));
/// assert_eq!(ctx.keys().collect::<Vec<_>>(), ["test", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: Map<String, Value>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(key.into(), value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns a variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Removes a variable, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.vars.shift_remove(key)
    }

    /// Returns `true` if the variable is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Copies every variable of `other` into this context; `other` wins.
    pub fn update(&mut self, other: Map<String, Value>) {
        self.vars.extend(other);
    }

    /// Returns the variable names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Returns the number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns the underlying map.
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.vars
    }

    /// Consumes the context and returns the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.vars
    }
}

impl From<Map<String, Value>> for Context {
    fn from(vars: Map<String, Value>) -> Self {
        Self { vars }
    }
}

impl From<Context> for Value {
    fn from(ctx: Context) -> Self {
        Self::Object(ctx.vars)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl serde::Serialize for Context {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.vars.serialize(serializer)
    }
}
