//! Query sets handed to views.
//!
//! A [`QuerySet`] holds rows that were already loaded by the application. Rows
//! are either full model instances or a projection produced by
//! [`QuerySet::values`] / [`QuerySet::values_list`]; views check which with
//! [`QuerySet::is_model_bearing`] instead of probing the rows.

use fbv_core::{FbvError, FbvResult};

use crate::model::{Model, ModelRecord};

/// The rows of a [`QuerySet`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySetRows {
    /// Full model instances.
    Instances(Vec<ModelRecord>),
    /// Projected rows: objects from `values()`, arrays or scalars from
    /// `values_list()`.
    Projection(Vec<serde_json::Value>),
}

/// An ordered, already evaluated collection of rows of one model.
///
/// # Examples
///
/// ```
/// use fbv_db::model::ModelRecord;
/// use fbv_db::queryset::QuerySet;
/// use fbv_db::value::Value;
///
/// let record = ModelRecord {
///     model: "blog.tag".into(),
///     pk_name: "id".into(),
///     pk: Value::Int(1),
///     fields: vec![("name".into(), Value::from("rust"))],
/// };
/// let qs = QuerySet::from_records("blog.tag", vec![record]);
/// let names = qs.values_list(&["name"], true).unwrap();
/// assert!(!names.is_model_bearing());
/// assert_eq!(names.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySet {
    model: String,
    rows: QuerySetRows,
}

impl QuerySet {
    /// Builds a model-bearing query set from instances.
    pub fn from_models<'a, M, I>(instances: I) -> Self
    where
        M: Model,
        I: IntoIterator<Item = &'a M>,
    {
        Self {
            model: M::label(),
            rows: QuerySetRows::Instances(
                instances.into_iter().map(ModelRecord::from_model).collect(),
            ),
        }
    }

    /// Builds a model-bearing query set from records of `model`.
    pub fn from_records(model: impl Into<String>, records: Vec<ModelRecord>) -> Self {
        Self {
            model: model.into(),
            rows: QuerySetRows::Instances(records),
        }
    }

    /// Returns an empty query set of `model`.
    pub fn none(model: impl Into<String>) -> Self {
        Self::from_records(model, Vec::new())
    }

    /// The `app_label.model_name` label of the rows.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The rows.
    pub const fn rows(&self) -> &QuerySetRows {
        &self.rows
    }

    /// Consumes the query set, returning its rows.
    pub fn into_rows(self) -> QuerySetRows {
        self.rows
    }

    /// Returns `true` when the rows are model instances.
    pub const fn is_model_bearing(&self) -> bool {
        matches!(self.rows, QuerySetRows::Instances(_))
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        match &self.rows {
            QuerySetRows::Instances(records) => records.len(),
            QuerySetRows::Projection(rows) => rows.len(),
        }
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Projects every instance into an object of the named fields.
    ///
    /// With no field names every field is included, the primary key first.
    /// `"pk"` is accepted as an alias of the primary key field.
    pub fn values(&self, fields: &[&str]) -> FbvResult<Self> {
        let records = self.instances("values")?;
        let rows = records
            .iter()
            .map(|record| {
                let mut row = serde_json::Map::new();
                if fields.is_empty() {
                    for (name, value) in record.all_values() {
                        row.insert(name.to_string(), value.to_json());
                    }
                } else {
                    for field in fields {
                        row.insert((*field).to_string(), lookup(record, field)?.to_json());
                    }
                }
                Ok(serde_json::Value::Object(row))
            })
            .collect::<FbvResult<Vec<_>>>()?;
        Ok(self.projected(rows))
    }

    /// Projects every instance into an array of the named fields, or into a
    /// single value per row when `flat` is set.
    ///
    /// `flat` requires exactly one field.
    pub fn values_list(&self, fields: &[&str], flat: bool) -> FbvResult<Self> {
        if flat && fields.len() != 1 {
            return Err(FbvError::ImproperlyConfigured(
                "'flat' is only valid when values_list is called with exactly one field"
                    .to_string(),
            ));
        }
        let records = self.instances("values_list")?;
        let rows = records
            .iter()
            .map(|record| {
                if flat {
                    return Ok(lookup(record, fields[0])?.to_json());
                }
                let row = if fields.is_empty() {
                    record
                        .all_values()
                        .into_iter()
                        .map(|(_, value)| value.to_json())
                        .collect()
                } else {
                    fields
                        .iter()
                        .map(|field| lookup(record, field).map(crate::value::Value::to_json))
                        .collect::<FbvResult<Vec<_>>>()?
                };
                Ok(serde_json::Value::Array(row))
            })
            .collect::<FbvResult<Vec<_>>>()?;
        Ok(self.projected(rows))
    }

    fn instances(&self, operation: &str) -> FbvResult<&[ModelRecord]> {
        match &self.rows {
            QuerySetRows::Instances(records) => Ok(records),
            QuerySetRows::Projection(_) => Err(FbvError::ImproperlyConfigured(format!(
                "Cannot call {operation}() on a projected query set of {}",
                self.model
            ))),
        }
    }

    fn projected(&self, rows: Vec<serde_json::Value>) -> Self {
        Self {
            model: self.model.clone(),
            rows: QuerySetRows::Projection(rows),
        }
    }
}

fn lookup<'a>(record: &'a ModelRecord, field: &str) -> FbvResult<&'a crate::value::Value> {
    record.get(field).ok_or_else(|| {
        FbvError::ImproperlyConfigured(format!(
            "Cannot resolve keyword '{field}' into field of {}",
            record.model
        ))
    })
}
