//! URL resolution.
//!
//! [`URLConf`] is an ordered list of [`URLPattern`]s. Resolving a path returns
//! the first matching pattern's handler together with the view's arguments as
//! a [`ResolverMatch`].

use std::fmt;

use serde_json::{Map, Value};

use fbv_core::{FbvError, FbvResult};

use super::pattern::{RouteHandler, URLPattern};

/// The result of resolving a path to a handler.
#[derive(Clone)]
pub struct ResolverMatch {
    /// The handler to call.
    pub func: RouteHandler,
    /// Positional arguments from unnamed regex groups.
    pub args: Vec<String>,
    /// Keyword arguments: captured values, overridden by bound kwargs.
    pub kwargs: Map<String, Value>,
    /// The name of the matched pattern, if any.
    pub url_name: Option<String>,
    /// The matched route string.
    pub route: String,
}

impl fmt::Debug for ResolverMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverMatch")
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .field("url_name", &self.url_name)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

impl ResolverMatch {
    /// Creates a match for `func` with the given keyword arguments. Mostly
    /// useful for calling views directly in tests.
    pub fn new(func: RouteHandler, kwargs: Map<String, Value>) -> Self {
        Self {
            func,
            args: Vec::new(),
            kwargs,
            url_name: None,
            route: String::new(),
        }
    }
}

/// An ordered URL configuration.
///
/// # Examples
///
/// ```
/// use fbv_http::urls::pattern::path;
/// use fbv_http::urls::resolver::URLConf;
/// use fbv_http::{HttpRequest, HttpResponse};
/// use std::sync::Arc;
///
/// let handler = Arc::new(|_req: HttpRequest| -> fbv_http::BoxFuture {
///     Box::pin(async { Ok(HttpResponse::ok("ok")) })
/// });
/// let conf = URLConf::new(vec![
///     path("robots.txt", handler, Some("robots")).unwrap()
///         .kwargs(serde_json::json!({"file_path": "robots.txt"})),
/// ]);
///
/// let m = conf.resolve("/robots.txt").unwrap();
/// assert_eq!(m.url_name.as_deref(), Some("robots"));
/// assert_eq!(m.kwargs["file_path"], "robots.txt");
/// assert!(conf.resolve("/missing").is_err());
/// ```
#[derive(Debug, Default)]
pub struct URLConf {
    patterns: Vec<URLPattern>,
}

impl URLConf {
    /// Creates a URL configuration from patterns, tried in order.
    pub const fn new(patterns: Vec<URLPattern>) -> Self {
        Self { patterns }
    }

    /// Appends a pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: URLPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Returns the patterns.
    pub fn patterns(&self) -> &[URLPattern] {
        &self.patterns
    }

    /// Resolves a request path. A leading `/` is ignored.
    ///
    /// When a bound kwarg has the same name as a captured value, the bound
    /// kwarg wins.
    ///
    /// # Errors
    ///
    /// [`FbvError::NotFound`] if no pattern matches.
    pub fn resolve(&self, path: &str) -> FbvResult<ResolverMatch> {
        let relative = path.strip_prefix('/').unwrap_or(path);

        for pattern in &self.patterns {
            if let Some(matched) = pattern.full_match(relative) {
                let mut kwargs = matched.kwargs;
                kwargs.extend(
                    pattern
                        .default_kwargs()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone())),
                );
                tracing::trace!(path, route = pattern.route(), "resolved");
                return Ok(ResolverMatch {
                    func: pattern.callback().clone(),
                    args: matched.args,
                    kwargs,
                    url_name: pattern.name().map(String::from),
                    route: pattern.route().to_string(),
                });
            }
        }

        Err(FbvError::NotFound(format!("No URL pattern matches '{path}'")))
    }

    /// Reverses a named pattern. See [`reverse`](super::reverse::reverse).
    pub fn reverse(
        &self,
        viewname: &str,
        args: &[String],
        kwargs: &Map<String, Value>,
    ) -> FbvResult<String> {
        super::reverse::reverse(viewname, args, kwargs, self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::urls::pattern::{path, re_path};
    use serde_json::json;

    fn handler(body: &'static str) -> RouteHandler {
        Arc::new(move |_req: crate::HttpRequest| -> crate::BoxFuture {
            Box::pin(async move { Ok(crate::HttpResponse::ok(body)) })
        })
    }

    fn conf() -> URLConf {
        URLConf::new(vec![
            path("", handler("home"), Some("home")).unwrap(),
            path("test-decorator", handler("decorated"), Some("test_decorator")).unwrap(),
            path("posts/<int:id>/", handler("post"), Some("post"))
                .unwrap()
                .kwargs(json!({"id": 1, "kind": "featured"})),
            re_path(r"page/([0-9]+)", handler("page"), None).unwrap(),
        ])
    }

    #[test]
    fn test_resolve_root() {
        let m = conf().resolve("/").unwrap();
        assert_eq!(m.url_name.as_deref(), Some("home"));
        assert!(m.kwargs.is_empty());
    }

    #[test]
    fn test_resolve_with_and_without_slash() {
        let conf = conf();
        assert_eq!(
            conf.resolve("/test-decorator").unwrap().route,
            "test-decorator"
        );
        assert_eq!(
            conf.resolve("test-decorator").unwrap().url_name.as_deref(),
            Some("test_decorator")
        );
    }

    #[test]
    fn test_bound_kwargs_win() {
        let m = conf().resolve("/posts/42/").unwrap();
        assert_eq!(m.kwargs["id"], json!(1));
        assert_eq!(m.kwargs["kind"], json!("featured"));
    }

    #[test]
    fn test_positional_args() {
        let m = conf().resolve("/page/7").unwrap();
        assert_eq!(m.args, vec!["7".to_string()]);
    }

    #[test]
    fn test_not_found() {
        let err = conf().resolve("/nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolved_handler_is_callable() {
        let m = conf().resolve("/test-decorator").unwrap();
        let req = crate::HttpRequest::builder().build();
        let resp = (m.func)(req).await.unwrap();
        assert_eq!(resp.content_bytes().unwrap(), b"decorated");
    }
}
