//! Context processors.
//!
//! A context processor adds variables to every context rendered for a
//! request. Variables set by the view take precedence over processor output.

use serde_json::{json, Map, Value};

use fbv_http::HttpRequest;

/// Adds variables to every template context.
pub trait ContextProcessor: Send + Sync {
    /// Returns the variables to add for `request`.
    fn process(&self, request: &HttpRequest) -> Map<String, Value>;
}

/// Adds `request` with the method, path and method flags.
///
/// ```text
/// {{ request.method }} {{ request.path }} {% if request.is_post %}...{% endif %}
/// ```
///
/// The `is_*` entries are present only once the method-flagging middleware
/// has run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContextProcessor;

impl ContextProcessor for RequestContextProcessor {
    fn process(&self, request: &HttpRequest) -> Map<String, Value> {
        let mut info = Map::new();
        info.insert("method".into(), json!(request.method().as_str()));
        info.insert("path".into(), json!(request.path()));
        info.insert("full_path".into(), json!(request.get_full_path()));
        if let Some(flags) = request.method_flags() {
            for (name, value) in flags.as_pairs() {
                info.insert(name.into(), Value::Bool(value));
            }
        }

        let mut ctx = Map::new();
        ctx.insert("request".into(), Value::Object(info));
        ctx
    }
}

/// Adds `debug`, the value of the `debug` setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugContextProcessor {
    /// Whether debug mode is on.
    pub debug: bool,
}

impl ContextProcessor for DebugContextProcessor {
    fn process(&self, _request: &HttpRequest) -> Map<String, Value> {
        let mut ctx = Map::new();
        ctx.insert("debug".into(), Value::Bool(self.debug));
        ctx
    }
}
