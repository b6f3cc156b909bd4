//! What views return.
//!
//! A view is an async function from [`HttpRequest`] to [`ViewOutput`]. A view
//! that builds its own response returns [`ViewOutput::Response`]; a view
//! wrapped by a render decorator may return data instead, which the
//! decorator turns into a response.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use fbv_core::{FbvError, FbvResult};
use fbv_db::{ModelRecord, QuerySet};
use fbv_http::urls::RouteHandler;
use fbv_http::{HttpRequest, HttpResponse};
use fbv_template::Context;

/// The future returned by a view.
pub type ViewFuture = Pin<Box<dyn Future<Output = FbvResult<ViewOutput>> + Send>>;

/// A view function.
pub type ViewFunction = Arc<dyn Fn(HttpRequest) -> ViewFuture + Send + Sync>;

/// The value a view returns.
#[derive(Debug)]
pub enum ViewOutput {
    /// A mapping, rendered by the HTML and JSON decorators.
    Context(Context),
    /// A list, rendered by the JSON decorator.
    List(Vec<serde_json::Value>),
    /// A single model instance.
    Model(ModelRecord),
    /// A query set, model-bearing or projected.
    QuerySet(QuerySet),
    /// A finished response.
    Response(HttpResponse),
    /// Any other value. Decorators pass it through untouched.
    Value(serde_json::Value),
}

impl ViewOutput {
    /// A short name for the variant, used in log messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Context(_) => "context",
            Self::List(_) => "list",
            Self::Model(_) => "model",
            Self::QuerySet(_) => "queryset",
            Self::Response(_) => "response",
            Self::Value(_) => "value",
        }
    }

    /// Returns the response if the view produced one.
    ///
    /// # Errors
    ///
    /// [`FbvError::InternalServerError`] for any other output: data reached
    /// the router without a render decorator.
    pub fn into_response(self) -> FbvResult<HttpResponse> {
        match self {
            Self::Response(response) => Ok(response),
            other => {
                tracing::warn!(kind = other.kind(), "view output was not rendered into a response");
                Err(FbvError::InternalServerError(format!(
                    "The view returned a {} instead of a response",
                    other.kind()
                )))
            }
        }
    }
}

impl From<HttpResponse> for ViewOutput {
    fn from(response: HttpResponse) -> Self {
        Self::Response(response)
    }
}

impl From<Context> for ViewOutput {
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

impl From<ModelRecord> for ViewOutput {
    fn from(record: ModelRecord) -> Self {
        Self::Model(record)
    }
}

impl From<QuerySet> for ViewOutput {
    fn from(queryset: QuerySet) -> Self {
        Self::QuerySet(queryset)
    }
}

impl From<Vec<serde_json::Value>> for ViewOutput {
    fn from(items: Vec<serde_json::Value>) -> Self {
        Self::List(items)
    }
}

/// Objects become [`ViewOutput::Context`], arrays [`ViewOutput::List`] and
/// everything else [`ViewOutput::Value`].
impl From<serde_json::Value> for ViewOutput {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::Context(Context::from(map)),
            serde_json::Value::Array(items) => Self::List(items),
            other => Self::Value(other),
        }
    }
}

/// Boxes an async function as a [`ViewFunction`].
///
/// ```
/// use fbv_views::{view, ViewOutput};
/// use fbv_http::HttpRequest;
///
/// let hello = view(|_req: HttpRequest| async {
///     Ok(ViewOutput::from(serde_json::json!({"test": 123})))
/// });
/// # let _ = hello;
/// ```
pub fn view<F, Fut>(f: F) -> ViewFunction
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FbvResult<ViewOutput>> + Send + 'static,
{
    Arc::new(move |request: HttpRequest| -> ViewFuture { Box::pin(f(request)) })
}

/// Turns a view into a URL handler. Outputs other than
/// [`ViewOutput::Response`] become errors.
pub fn into_handler(view: ViewFunction) -> RouteHandler {
    Arc::new(move |request: HttpRequest| -> fbv_http::BoxFuture {
        let view = view.clone();
        Box::pin(async move { view(request).await?.into_response() })
    })
}

/// Identifies a view function by module path and function name.
///
/// Used to derive a default template name. Build one with [`view_name!`]
/// to capture the current module path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewName {
    module: String,
    function: String,
}

impl ViewName {
    /// Creates a view name. `module` may use `::` or `.` separators.
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }

    /// The module path.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The function name.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The module path segments.
    pub fn module_segments(&self) -> Vec<&str> {
        let separator = if self.module.contains("::") { "::" } else { "." };
        self.module
            .split(separator)
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

impl std::fmt::Display for ViewName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.module, self.function)
    }
}

/// Builds a [`ViewName`] from the calling module and a function name.
///
/// ```
/// let name = fbv_views::view_name!(index);
/// assert_eq!(name.function(), "index");
/// assert_eq!(name.module(), module_path!());
/// ```
#[macro_export]
macro_rules! view_name {
    ($function:ident) => {
        $crate::ViewName::new(module_path!(), stringify!($function))
    };
}
