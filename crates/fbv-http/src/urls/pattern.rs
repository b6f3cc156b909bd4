//! URL pattern parsing and matching.
//!
//! [`path`] builds a [`URLPattern`] from a Django-style route such as
//! `articles/<int:year>/`; [`re_path`] builds one from a raw regex. Patterns
//! can carry bound keyword arguments (see [`URLPattern::kwargs`]) that are
//! passed to the view on every match.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};

use fbv_core::{FbvError, FbvResult};

use super::converters::{self, PathConverter};

/// A named converter entry: `(parameter_name, converter)`.
pub type ConverterEntry = (String, Arc<dyn PathConverter>);

/// A routed handler: an async function from request to response.
pub type RouteHandler = Arc<dyn Fn(crate::HttpRequest) -> crate::BoxFuture + Send + Sync>;

/// What a successful match produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternMatch {
    /// Values of unnamed groups (`re_path` patterns without named groups).
    pub args: Vec<String>,
    /// Converted values of named placeholders or groups.
    pub kwargs: Map<String, Value>,
}

/// A single URL pattern that matches a path and invokes a handler.
pub struct URLPattern {
    route: String,
    regex: Regex,
    name: Option<String>,
    converters: Vec<ConverterEntry>,
    default_kwargs: Map<String, Value>,
    callback: RouteHandler,
    is_regex: bool,
}

impl fmt::Debug for URLPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("URLPattern")
            .field("route", &self.route)
            .field("regex", &self.regex.as_str())
            .field("name", &self.name)
            .field("converters", &self.converters)
            .field("default_kwargs", &self.default_kwargs)
            .finish_non_exhaustive()
    }
}

impl URLPattern {
    /// Binds extra keyword arguments passed to the view on every match.
    ///
    /// ```
    /// use fbv_http::urls::pattern::path;
    /// use fbv_http::HttpResponse;
    /// use std::sync::Arc;
    ///
    /// let handler = Arc::new(|_req: fbv_http::HttpRequest| -> fbv_http::BoxFuture {
    ///     Box::pin(async { Ok(HttpResponse::ok("")) })
    /// });
    /// let pattern = path("robots.txt", handler, None)
    ///     .unwrap()
    ///     .kwargs(serde_json::json!({"file_path": "robots.txt"}));
    /// assert_eq!(pattern.default_kwargs()["file_path"], "robots.txt");
    /// ```
    ///
    /// Anything other than a JSON object is ignored.
    #[must_use]
    pub fn kwargs(mut self, kwargs: Value) -> Self {
        if let Value::Object(map) = kwargs {
            self.default_kwargs.extend(map);
        }
        self
    }

    /// Returns the original route string.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the optional name used by `reverse`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the named converters in placeholder order.
    pub fn converters(&self) -> &[ConverterEntry] {
        &self.converters
    }

    /// Returns the bound keyword arguments.
    pub const fn default_kwargs(&self) -> &Map<String, Value> {
        &self.default_kwargs
    }

    /// Returns the handler.
    pub fn callback(&self) -> &RouteHandler {
        &self.callback
    }

    /// Returns `true` if this pattern was built by [`re_path`].
    pub const fn is_regex(&self) -> bool {
        self.is_regex
    }

    /// Matches the whole of `path` (no leading `/`).
    ///
    /// Returns `None` if the path does not match or a converter rejects a
    /// captured value.
    pub fn full_match(&self, path: &str) -> Option<PatternMatch> {
        let captures = self.regex.captures(path)?;
        let mut result = PatternMatch::default();

        if self.converters.is_empty() {
            let names: Vec<&str> = self.regex.capture_names().flatten().collect();
            if names.is_empty() {
                result.args = captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .collect();
            } else {
                for name in names {
                    if let Some(m) = captures.name(name) {
                        result
                            .kwargs
                            .insert(name.to_string(), Value::from(m.as_str()));
                    }
                }
            }
        } else {
            for (name, converter) in &self.converters {
                let raw = captures.name(name)?.as_str();
                let value = converter.to_value(raw).ok()?;
                result.kwargs.insert(name.clone(), value);
            }
        }

        Some(result)
    }
}

/// Splits the inside of `<type:name>`; a bare `<name>` means `str`.
fn parse_type_and_name(inner: &str) -> (&str, &str) {
    inner.split_once(':').unwrap_or(("str", inner))
}

/// A piece of a Django-style route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteToken<'a> {
    /// Literal text.
    Literal(&'a str),
    /// A `<type:name>` placeholder.
    Placeholder { type_name: &'a str, name: &'a str },
}

/// Splits a route into literal text and placeholders.
pub(crate) fn tokenize_route(route: &str) -> FbvResult<Vec<RouteToken<'_>>> {
    let mut tokens = Vec::new();
    let mut remaining = route;
    while let Some(start) = remaining.find('<') {
        if start > 0 {
            tokens.push(RouteToken::Literal(&remaining[..start]));
        }
        let end = remaining[start..].find('>').ok_or_else(|| {
            FbvError::ImproperlyConfigured(format!("Unclosed angle bracket in route: {route}"))
        })? + start;
        let (type_name, name) = parse_type_and_name(&remaining[start + 1..end]);
        tokens.push(RouteToken::Placeholder { type_name, name });
        remaining = &remaining[end + 1..];
    }
    if !remaining.is_empty() {
        tokens.push(RouteToken::Literal(remaining));
    }
    Ok(tokens)
}

/// Creates a URL pattern from a Django-style route.
///
/// # Examples
///
/// ```
/// use fbv_http::urls::pattern::path;
/// use fbv_http::HttpResponse;
/// use std::sync::Arc;
///
/// let handler = Arc::new(|_req: fbv_http::HttpRequest| -> fbv_http::BoxFuture {
///     Box::pin(async { Ok(HttpResponse::ok("Hello")) })
/// });
///
/// let pattern = path("articles/<int:year>/", handler, Some("article-year")).unwrap();
/// assert_eq!(pattern.name(), Some("article-year"));
/// let m = pattern.full_match("articles/2024/").unwrap();
/// assert_eq!(m.kwargs["year"], 2024);
/// ```
///
/// # Errors
///
/// [`FbvError::ImproperlyConfigured`] for unknown converter types, duplicate
/// parameter names or malformed placeholders.
pub fn path(route: &str, callback: RouteHandler, name: Option<&str>) -> FbvResult<URLPattern> {
    let mut regex_str = String::from("^");
    let mut converter_list: Vec<ConverterEntry> = Vec::new();

    for token in tokenize_route(route)? {
        match token {
            RouteToken::Literal(text) => regex_str.push_str(&regex::escape(text)),
            RouteToken::Placeholder {
                type_name,
                name: param,
            } => {
                if converter_list.iter().any(|(n, _)| n == param) {
                    return Err(FbvError::ImproperlyConfigured(format!(
                        "Route '{route}' uses parameter name '{param}' more than once"
                    )));
                }
                let converter = converters::get_converter(type_name)?;
                write!(regex_str, "(?P<{param}>{})", converter.regex()).ok();
                converter_list.push((param.to_string(), converter));
            }
        }
    }
    regex_str.push('$');

    let regex = Regex::new(&regex_str)
        .map_err(|e| FbvError::ImproperlyConfigured(format!("Invalid pattern regex: {e}")))?;

    Ok(URLPattern {
        route: route.to_string(),
        regex,
        name: name.map(String::from),
        converters: converter_list,
        default_kwargs: Map::new(),
        callback,
        is_regex: false,
    })
}

/// Creates a URL pattern from a regex.
///
/// Named groups become string keyword arguments; when there are none, the
/// unnamed groups become positional arguments.
///
/// # Errors
///
/// [`FbvError::ImproperlyConfigured`] if the regex is invalid.
pub fn re_path(
    regex_str: &str,
    callback: RouteHandler,
    name: Option<&str>,
) -> FbvResult<URLPattern> {
    let anchored = format!(
        "^{}$",
        regex_str.trim_start_matches('^').trim_end_matches('$')
    );
    let regex = Regex::new(&anchored)
        .map_err(|e| FbvError::ImproperlyConfigured(format!("Invalid regex pattern: {e}")))?;

    Ok(URLPattern {
        route: regex_str.to_string(),
        regex,
        name: name.map(String::from),
        converters: Vec::new(),
        default_kwargs: Map::new(),
        callback,
        is_regex: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dummy_handler() -> RouteHandler {
        Arc::new(|_req: crate::HttpRequest| -> crate::BoxFuture {
            Box::pin(async { Ok(crate::HttpResponse::ok("ok")) })
        })
    }

    #[test]
    fn test_path_without_params() {
        let p = path("test-decorator", dummy_handler(), Some("test_decorator")).unwrap();
        assert_eq!(p.name(), Some("test_decorator"));
        assert!(p.full_match("test-decorator").is_some());
        assert!(p.full_match("test-decorator/").is_none());
        assert!(p.full_match("other").is_none());
    }

    #[test]
    fn test_dots_are_literal() {
        let p = path("robots.txt", dummy_handler(), None).unwrap();
        assert!(p.full_match("robots.txt").is_some());
        assert!(p.full_match("robotsxtxt").is_none());
    }

    #[test]
    fn test_empty_route_matches_root() {
        let p = path("", dummy_handler(), Some("home")).unwrap();
        assert!(p.full_match("").is_some());
        assert!(p.full_match("x").is_none());
    }

    #[test]
    fn test_typed_params() {
        let p = path("articles/<int:year>/<slug:title>/", dummy_handler(), None).unwrap();
        let m = p.full_match("articles/2024/hello-world/").unwrap();
        assert_eq!(m.kwargs["year"], json!(2024));
        assert_eq!(m.kwargs["title"], json!("hello-world"));
        assert!(m.args.is_empty());
        assert!(p.full_match("articles/twenty/hello/").is_none());
    }

    #[test]
    fn test_bare_placeholder_is_str() {
        let p = path("users/<username>/", dummy_handler(), None).unwrap();
        let m = p.full_match("users/alice/").unwrap();
        assert_eq!(m.kwargs["username"], json!("alice"));
        assert!(p.full_match("users/a/b/").is_none());
    }

    #[test]
    fn test_path_param() {
        let p = path("files/<path:file_path>", dummy_handler(), None).unwrap();
        let m = p.full_match("files/static/img/github.png").unwrap();
        assert_eq!(m.kwargs["file_path"], json!("static/img/github.png"));
    }

    #[test]
    fn test_bound_kwargs() {
        let p = path("test-redirect-301", dummy_handler(), None)
            .unwrap()
            .kwargs(json!({"pattern_name": "test_decorator", "permanent": true}));
        assert_eq!(p.default_kwargs()["permanent"], json!(true));
        let ignored = path("x", dummy_handler(), None).unwrap().kwargs(json!([1]));
        assert!(ignored.default_kwargs().is_empty());
    }

    #[test]
    fn test_invalid_routes() {
        assert!(path("a/<int:id", dummy_handler(), None).is_err());
        assert!(path("a/<float:id>/", dummy_handler(), None).is_err());
        assert!(path("a/<id>/<int:id>/", dummy_handler(), None).is_err());
    }

    #[test]
    fn test_re_path_named_groups() {
        let p = re_path(r"^archive/(?P<year>[0-9]{4})/$", dummy_handler(), None).unwrap();
        let m = p.full_match("archive/1999/").unwrap();
        assert_eq!(m.kwargs["year"], json!("1999"));
        assert!(p.is_regex());
    }

    #[test]
    fn test_re_path_positional_groups() {
        let p = re_path(r"page/([0-9]+)/([a-z]+)", dummy_handler(), None).unwrap();
        let m = p.full_match("page/3/abc").unwrap();
        assert_eq!(m.args, vec!["3".to_string(), "abc".to_string()]);
        assert!(m.kwargs.is_empty());
    }
}
