//! Model trait and serialized model records.
//!
//! The [`Model`] trait describes a model instance well enough for views to
//! serialize it: its metadata, its primary key and its field values.
//! [`ModelRecord`] is the type-erased snapshot views pass around.

use crate::value::Value;

/// The trait implemented by model types.
///
/// # Examples
///
/// ```
/// use fbv_db::model::{Model, ModelMeta};
/// use fbv_db::value::Value;
///
/// struct Article {
///     id: i64,
///     title: String,
/// }
///
/// impl Model for Article {
///     fn meta() -> &'static ModelMeta {
///         static META: ModelMeta = ModelMeta::new("blog", "article");
///         &META
///     }
///
///     fn pk(&self) -> Value {
///         Value::Int(self.id)
///     }
///
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", Value::Int(self.id)), ("title", Value::from(self.title.as_str()))]
///     }
/// }
///
/// let a = Article { id: 1, title: "Hello".into() };
/// assert_eq!(a.non_pk_field_values().len(), 1);
/// assert_eq!(Article::label(), "blog.article");
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// Returns the primary key value, or [`Value::Null`] if unsaved.
    fn pk(&self) -> Value;

    /// Returns the name of the primary key field.
    fn pk_field_name() -> &'static str {
        "id"
    }

    /// Returns all field name-value pairs in declaration order.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Returns field name-value pairs excluding the primary key.
    fn non_pk_field_values(&self) -> Vec<(&'static str, Value)> {
        let pk_name = Self::pk_field_name();
        self.field_values()
            .into_iter()
            .filter(|(name, _)| *name != pk_name)
            .collect()
    }

    /// Returns the `app_label.model_name` label.
    fn label() -> String {
        Self::meta().label()
    }
}

/// Static metadata about a model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMeta {
    /// The application label (e.g. "blog").
    pub app_label: &'static str,
    /// The model name in lowercase (e.g. "article").
    pub model_name: &'static str,
}

impl ModelMeta {
    /// Creates metadata for `app_label.model_name`.
    pub const fn new(app_label: &'static str, model_name: &'static str) -> Self {
        Self {
            app_label,
            model_name,
        }
    }

    /// Returns the `app_label.model_name` label.
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }
}

/// A serialized model instance.
///
/// `fields` never contains the primary key; it is held in `pk` and its field
/// name in `pk_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRecord {
    /// The `app_label.model_name` label.
    pub model: String,
    /// The primary key field name.
    pub pk_name: String,
    /// The primary key value.
    pub pk: Value,
    /// Non-pk fields in declaration order.
    pub fields: Vec<(String, Value)>,
}

impl ModelRecord {
    /// Snapshots a model instance.
    pub fn from_model<M: Model>(instance: &M) -> Self {
        Self {
            model: M::label(),
            pk_name: M::pk_field_name().to_string(),
            pk: instance.pk(),
            fields: instance
                .non_pk_field_values()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Looks up an attribute by name.
    ///
    /// `"pk"` and the primary key field name both return the primary key.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if name == "pk" || name == self.pk_name {
            return Some(&self.pk);
        }
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Returns the primary key followed by the other fields, each under its
    /// field name.
    pub fn all_values(&self) -> Vec<(&str, &Value)> {
        std::iter::once((self.pk_name.as_str(), &self.pk))
            .chain(self.fields.iter().map(|(name, value)| (name.as_str(), value)))
            .collect()
    }
}

impl<M: Model> From<&M> for ModelRecord {
    fn from(instance: &M) -> Self {
        Self::from_model(instance)
    }
}
