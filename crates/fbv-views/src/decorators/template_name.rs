//! Template name resolution for rendered views.
//!
//! The name used to render a context is, in order of precedence:
//!
//! 1. the `TEMPLATE` entry of the context (removed before rendering),
//! 2. the name given to the decorator,
//! 3. a name derived from the view's module path and function name.
//!
//! A name whose last path segment has no `.` gets `.html` appended.

use fbv_core::{FbvError, FbvResult};
use fbv_template::Context;

use crate::output::ViewName;

/// The context key that overrides the template name.
pub const TEMPLATE_KEY: &str = "TEMPLATE";

/// Derives a template name from a view's module path and function name.
///
/// With more than two module segments every `views` segment is dropped; with
/// exactly two the last is dropped; a single segment is kept.
///
/// ```
/// use fbv_views::ViewName;
/// use fbv_views::decorators::derive_template_name;
///
/// assert_eq!(derive_template_name(&ViewName::new("a.views.b", "c")), "a/b/c.html");
/// assert_eq!(derive_template_name(&ViewName::new("fbv.views", "html_view")), "fbv/html_view.html");
/// assert_eq!(derive_template_name(&ViewName::new("blog", "index")), "blog/index.html");
/// ```
pub fn derive_template_name(view: &ViewName) -> String {
    let segments = view.module_segments();
    let dir: Vec<&str> = match segments.len() {
        0 | 1 => segments,
        2 => segments[..1].to_vec(),
        _ => segments.into_iter().filter(|s| *s != "views").collect(),
    };

    let mut parts = dir;
    parts.push(view.function());
    with_extension(&parts.join("/"))
}

/// Appends `.html` if the last path segment has no extension.
pub fn with_extension(name: &str) -> String {
    let last = name.rsplit('/').next().unwrap_or(name);
    if last.contains('.') {
        name.to_string()
    } else {
        format!("{name}.html")
    }
}

/// Picks the template for one render and removes `TEMPLATE` from `context`.
///
/// A `TEMPLATE` key replaces the configured name even when it is `null` or
/// empty; both of those derive the name from `view`.
///
/// # Errors
///
/// [`FbvError::ImproperlyConfigured`] if `TEMPLATE` holds something other
/// than a string or `null`.
pub fn resolve_template_name(
    view: &ViewName,
    template_name: Option<&str>,
    context: &mut Context,
) -> FbvResult<String> {
    let name = match context.remove(TEMPLATE_KEY) {
        None => template_name.map(String::from),
        Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(name)) => Some(name),
        Some(other) => {
            return Err(FbvError::ImproperlyConfigured(format!(
                "{TEMPLATE_KEY} must be a template name, got {other}"
            )))
        }
    };
    let name = name.filter(|name| !name.is_empty());

    let resolved = match name {
        Some(name) => with_extension(&name),
        None => derive_template_name(view),
    };
    tracing::debug!(view = %view, template = %resolved, "resolved template name");
    Ok(resolved)
}
