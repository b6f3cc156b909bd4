//! The JSON render decorator.
//!
//! A wrapped view's model instances, query sets, mappings and lists become a
//! JSON response. Responses and other values pass through unchanged.
//!
//! Models are flattened: the primary key comes first as `pk`, followed by the
//! other fields in declaration order.
//!
//! ```text
//! {"pk":1,"name":"test123","is_valid":false}
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};

use fbv_core::{FbvError, FbvResult, JsonSettings};
use fbv_db::{ModelRecord, QuerySetRows};
use fbv_http::{HttpRequest, JsonEncoder, JsonResponse, Separators};

use crate::output::{ViewFunction, ViewFuture, ViewOutput};

/// Flattens a model record into a JSON object.
///
/// Without `fields` the object is `pk` followed by every non-pk field. With
/// `fields`, `pk` is kept only if listed, `id` is added (holding the primary
/// key) if listed, and only the listed non-pk fields remain.
pub fn serialize_record(record: &ModelRecord, fields: Option<&[String]>) -> Map<String, Value> {
    let wants = |name: &str| fields.map_or(true, |fields| fields.iter().any(|f| f == name));
    let mut object = Map::new();

    if wants("pk") {
        object.insert("pk".into(), record.pk.to_json());
    }
    if fields.is_some() && wants("id") {
        object.insert("id".into(), record.pk.to_json());
    }
    for (name, value) in &record.fields {
        if wants(name) {
            object.insert(name.clone(), value.to_json());
        }
    }
    object
}

/// Renders view outputs as JSON responses.
///
/// # Examples
///
/// ```
/// use fbv_views::decorators::RenderJson;
/// use fbv_views::ViewOutput;
///
/// let decorator = RenderJson::new().separators((", ", ": "));
/// let output = decorator.render(ViewOutput::from(serde_json::json!({"test": 123}))).unwrap();
/// let ViewOutput::Response(response) = output else { unreachable!() };
/// assert_eq!(response.content_type(), "application/json");
/// assert_eq!(response.content_bytes().unwrap(), br#"{"test": 123}"#);
/// ```
#[derive(Debug, Clone)]
pub struct RenderJson {
    fields: Option<Vec<String>>,
    separators: Separators,
    item_separator: Option<String>,
    key_separator: Option<String>,
    ensure_ascii: bool,
}

impl Default for RenderJson {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderJson {
    /// Creates a decorator with minified separators.
    pub fn new() -> Self {
        Self::from_settings(&JsonSettings::default())
    }

    /// Creates a decorator whose defaults come from `settings`.
    pub fn from_settings(settings: &JsonSettings) -> Self {
        Self {
            fields: None,
            separators: Separators::from_settings(settings),
            item_separator: None,
            key_separator: None,
            ensure_ascii: settings.ensure_ascii,
        }
    }

    /// Restricts model output to these fields. Only valid for views
    /// returning a model or a query set.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces both separators.
    #[must_use]
    pub fn separators(mut self, separators: impl Into<Separators>) -> Self {
        self.separators = separators.into();
        self
    }

    /// Overrides the item separator. An empty string is ignored.
    #[must_use]
    pub fn item_separator(mut self, separator: impl Into<String>) -> Self {
        self.item_separator = Some(separator.into());
        self
    }

    /// Overrides the key separator. An empty string is ignored.
    #[must_use]
    pub fn key_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_separator = Some(separator.into());
        self
    }

    /// Sets whether non-ASCII characters are escaped.
    #[must_use]
    pub const fn ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.ensure_ascii = ensure_ascii;
        self
    }

    /// The separators the response will use.
    pub fn resolved_separators(&self) -> Separators {
        let mut separators = self.separators.clone();
        if let Some(item) = self.item_separator.as_deref().filter(|s| !s.is_empty()) {
            item.clone_into(&mut separators.item);
        }
        if let Some(key) = self.key_separator.as_deref().filter(|s| !s.is_empty()) {
            key.clone_into(&mut separators.key);
        }
        separators
    }

    /// Turns one view output into a JSON response, or passes it through.
    ///
    /// # Errors
    ///
    /// [`FbvError::ImproperlyConfigured`] if `fields` is set and the output
    /// is not a model or a query set.
    pub fn render(&self, output: ViewOutput) -> FbvResult<ViewOutput> {
        let fields = self.fields.as_deref();
        let data = match output {
            ViewOutput::Model(record) => Value::Object(serialize_record(&record, fields)),
            ViewOutput::QuerySet(queryset) => match queryset.into_rows() {
                QuerySetRows::Instances(records) => Value::Array(
                    records
                        .iter()
                        .map(|record| Value::Object(serialize_record(record, fields)))
                        .collect(),
                ),
                QuerySetRows::Projection(rows) => Value::Array(rows),
            },
            other if self.fields.is_some() => {
                return Err(FbvError::ImproperlyConfigured(format!(
                    "The `fields` option only applies to models and query sets, not to a {}",
                    other.kind()
                )));
            }
            ViewOutput::Context(context) => Value::from(context),
            ViewOutput::List(items) => Value::Array(items),
            other @ (ViewOutput::Response(_) | ViewOutput::Value(_)) => return Ok(other),
        };

        let encoder = JsonEncoder::new(self.resolved_separators(), self.ensure_ascii);
        JsonResponse::with_encoder(&data, &encoder).map(ViewOutput::Response)
    }

    /// Wraps `view`.
    pub fn wrap(self, view: ViewFunction) -> ViewFunction {
        let decorator = Arc::new(self);
        Arc::new(move |request: HttpRequest| -> ViewFuture {
            let decorator = decorator.clone();
            let view = view.clone();
            Box::pin(async move {
                let output = view(request).await?;
                decorator.render(output).map_err(|e| {
                    tracing::error!(error = %e, "JSON rendering failed");
                    e
                })
            })
        })
    }
}

/// Wraps `view` with [`RenderJson`] defaults.
pub fn render_json(view: ViewFunction) -> ViewFunction {
    RenderJson::new().wrap(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use fbv_db::{Model, ModelMeta, QuerySet, Value as DbValue};
    use fbv_http::HttpResponse;
    use serde_json::json;

    use crate::output::view;

    struct FakeModel {
        id: Option<i64>,
        name: String,
        is_valid: bool,
    }

    static FAKE_MODEL: ModelMeta = ModelMeta::new("tests", "fakemodel");

    impl Model for FakeModel {
        fn meta() -> &'static ModelMeta {
            &FAKE_MODEL
        }

        fn pk(&self) -> DbValue {
            self.id.map_or(DbValue::Null, DbValue::Int)
        }

        fn field_values(&self) -> Vec<(&'static str, DbValue)> {
            vec![
                ("id", self.pk()),
                ("name", DbValue::from(self.name.as_str())),
                ("is_valid", DbValue::Bool(self.is_valid)),
            ]
        }
    }

    fn fake(id: Option<i64>, name: &str, is_valid: bool) -> FakeModel {
        FakeModel {
            id,
            name: name.to_string(),
            is_valid,
        }
    }

    fn text(output: ViewOutput) -> String {
        let ViewOutput::Response(response) = output else {
            panic!("expected a response, got {}", output.kind());
        };
        assert_eq!(response.content_type(), "application/json");
        String::from_utf8(response.content_bytes().unwrap()).unwrap()
    }

    fn render(decorator: &RenderJson, output: impl Into<ViewOutput>) -> String {
        text(decorator.render(output.into()).unwrap())
    }

    #[test]
    fn test_dictionary() {
        assert_eq!(render(&RenderJson::new(), json!({"test": 123})), r#"{"test":123}"#);
        assert_eq!(
            render(&RenderJson::new(), json!({"test": "test123"})),
            r#"{"test":"test123"}"#
        );
    }

    #[test]
    fn test_dictionary_separators() {
        let decorator = RenderJson::new().separators(JsonSettings::DEFAULT_SEPARATORS);
        assert_eq!(render(&decorator, json!({"test": 123})), r#"{"test": 123}"#);
    }

    #[test]
    fn test_single_separator_overrides() {
        let decorator = RenderJson::new().item_separator(", ");
        assert_eq!(render(&decorator, json!({"a": 1, "b": 2})), r#"{"a":1, "b":2}"#);

        let decorator = RenderJson::new()
            .separators(JsonSettings::DEFAULT_SEPARATORS)
            .key_separator("=");
        assert_eq!(render(&decorator, json!({"a": 1, "b": 2})), r#"{"a"=1, "b"=2}"#);

        let decorator = RenderJson::new().item_separator("").key_separator("");
        assert_eq!(decorator.resolved_separators(), Separators::minified());
    }

    #[test]
    fn test_settings_seed_defaults() {
        let settings = JsonSettings {
            item_separator: ", ".into(),
            key_separator: ": ".into(),
            ensure_ascii: true,
        };
        let decorator = RenderJson::from_settings(&settings);
        assert_eq!(render(&decorator, json!({"a": [1, 2]})), r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn test_list_is_valid_top_level() {
        assert_eq!(render(&RenderJson::new(), vec![json!(1), json!("x")]), r#"[1,"x"]"#);
    }

    #[test]
    fn test_not_dictionary_passes_through() {
        let output = RenderJson::new().render(ViewOutput::from(json!("test123"))).unwrap();
        assert!(matches!(output, ViewOutput::Value(ref v) if v == "test123"));

        let output = RenderJson::new()
            .render(ViewOutput::from(HttpResponse::ok("raw")))
            .unwrap();
        let ViewOutput::Response(response) = output else {
            panic!("expected the response back");
        };
        assert_eq!(response.content_type(), "text/html; charset=utf-8");
    }

    #[test]
    fn test_fields_on_dictionary_is_rejected() {
        let err = RenderJson::new()
            .fields(["test"])
            .render(ViewOutput::from(json!({"test": 123})))
            .unwrap_err();
        assert!(matches!(err, FbvError::ImproperlyConfigured(_)));
    }

    #[test]
    fn test_unsaved_model() {
        let record = ModelRecord::from(&fake(None, "test123", false));
        assert_eq!(
            render(&RenderJson::new(), record),
            r#"{"pk":null,"name":"test123","is_valid":false}"#
        );
    }

    #[test]
    fn test_model_fields() {
        let record = ModelRecord::from(&fake(Some(456), "test789", false));
        let decorator = RenderJson::new().fields(["name"]);
        assert_eq!(render(&decorator, record.clone()), r#"{"name":"test789"}"#);

        let decorator = RenderJson::new().fields(["id", "name"]);
        assert_eq!(render(&decorator, record.clone()), r#"{"id":456,"name":"test789"}"#);

        let decorator = RenderJson::new().fields(["pk", "is_valid"]);
        assert_eq!(render(&decorator, record), r#"{"pk":456,"is_valid":false}"#);
    }

    #[test]
    fn test_queryset() {
        let models = [fake(Some(1), "test123", true), fake(Some(2), "test456", false)];
        let queryset = QuerySet::from_models(&models);
        assert_eq!(
            render(&RenderJson::new(), queryset),
            r#"[{"pk":1,"name":"test123","is_valid":true},{"pk":2,"name":"test456","is_valid":false}]"#
        );
    }

    #[test]
    fn test_queryset_fields() {
        let models = [fake(Some(1), "a", true)];
        let decorator = RenderJson::new().fields(["name"]);
        assert_eq!(
            render(&decorator, QuerySet::from_models(&models)),
            r#"[{"name":"a"}]"#
        );
    }

    #[test]
    fn test_projection_rows_pass_through() {
        let models = [fake(Some(1), "a", true), fake(Some(2), "b", false)];
        let queryset = QuerySet::from_models(&models);

        let values = queryset.values(&["name"]).unwrap();
        assert_eq!(render(&RenderJson::new(), values), r#"[{"name":"a"},{"name":"b"}]"#);

        let flat = queryset.values_list(&["name"], true).unwrap();
        assert_eq!(render(&RenderJson::new(), flat), r#"["a","b"]"#);
    }

    #[test]
    fn test_dates_and_times() {
        let record = ModelRecord {
            model: "tests.event".into(),
            pk_name: "id".into(),
            pk: DbValue::Int(1),
            fields: vec![
                (
                    "on".into(),
                    DbValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
                ),
                (
                    "at".into(),
                    DbValue::DateTimeTz(
                        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
                            + chrono::Duration::microseconds(123_456),
                    ),
                ),
            ],
        };
        assert_eq!(
            render(&RenderJson::new(), record),
            r#"{"pk":1,"on":"2024-01-15","at":"2024-01-15T10:30:00.123Z"}"#
        );
    }

    #[test]
    fn test_ensure_ascii() {
        assert_eq!(render(&RenderJson::new(), json!({"e": "✨"})), r#"{"e":"\u2728"}"#);
        let decorator = RenderJson::new().ensure_ascii(false);
        assert_eq!(render(&decorator, json!({"e": "✨"})), r#"{"e":"✨"}"#);
    }

    #[tokio::test]
    async fn test_wrap() {
        let wrapped = render_json(view(|_req: HttpRequest| async {
            Ok(ViewOutput::from(json!({"test": 123})))
        }));
        let output = wrapped(HttpRequest::builder().build()).await.unwrap();
        assert_eq!(text(output), r#"{"test":123}"#);
    }

    #[tokio::test]
    async fn test_wrap_reports_fields_misuse() {
        let wrapped = RenderJson::new()
            .fields(["test"])
            .wrap(view(|_req: HttpRequest| async {
                Ok(ViewOutput::from(json!({"test": 123})))
            }));
        let err = wrapped(HttpRequest::builder().build()).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
