//! Building [`HttpRequest`]s for calling views directly.
//!
//! [`RequestFactory`] skips routing and middleware. Requests can be given
//! method flags, as if the method-flag middleware had run, and bound kwargs,
//! as if a URL pattern had matched.
//!
//! ```
//! use fbv_test::RequestFactory;
//! use serde_json::json;
//!
//! let factory = RequestFactory::new().with_method_flags();
//! let mut request = factory.get("/favicon.ico?v=2");
//! RequestFactory::with_kwargs(&mut request, json!({"emoji": "✨"}));
//!
//! assert!(request.is_get());
//! assert_eq!(request.path(), "/favicon.ico");
//! assert_eq!(request.query_string(), "v=2");
//! assert_eq!(request.kwarg_str("emoji"), Some("✨"));
//! ```

use std::sync::Arc;

use http::Method;
use serde_json::{Map, Value};

use fbv_http::urls::{ResolverMatch, RouteHandler, URLConf};
use fbv_http::{BoxFuture, HttpRequest, HttpResponse, MethodFlags};

/// Builds requests without routing or middleware.
#[derive(Debug, Default, Clone)]
pub struct RequestFactory {
    default_headers: Vec<(String, String)>,
    method_flags: bool,
    urlconf: Option<Arc<URLConf>>,
}

impl RequestFactory {
    /// Creates a factory that builds plain requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header to every request.
    #[must_use]
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Sets method flags on every request.
    #[must_use]
    pub const fn with_method_flags(mut self) -> Self {
        self.method_flags = true;
        self
    }

    /// Attaches `urlconf` to every request so views can reverse URLs.
    #[must_use]
    pub fn with_urlconf(mut self, urlconf: Arc<URLConf>) -> Self {
        self.urlconf = Some(urlconf);
        self
    }

    /// Builds a GET request.
    pub fn get(&self, path: &str) -> HttpRequest {
        self.request(Method::GET, path, Vec::new())
    }

    /// Builds a HEAD request.
    pub fn head(&self, path: &str) -> HttpRequest {
        self.request(Method::HEAD, path, Vec::new())
    }

    /// Builds a POST request with a JSON body.
    pub fn post_json(&self, path: &str, json: &Value) -> HttpRequest {
        let body = serde_json::to_vec(json).unwrap_or_default();
        self.build(Method::POST, path, body, Some("application/json"))
    }

    /// Builds a DELETE request.
    pub fn delete(&self, path: &str) -> HttpRequest {
        self.request(Method::DELETE, path, Vec::new())
    }

    /// Builds a request with any method and body. A `?` in `path` starts the
    /// query string.
    pub fn request(&self, method: Method, path: &str, body: Vec<u8>) -> HttpRequest {
        self.build(method, path, body, None)
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> HttpRequest {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));

        let mut builder = HttpRequest::builder()
            .method(method.clone())
            .path(path)
            .query_string(query)
            .body(body);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        if self.method_flags {
            builder = builder.method_flags(MethodFlags::for_method(method.as_str()));
        }
        if let Some(urlconf) = &self.urlconf {
            builder = builder.urlconf(urlconf.clone());
        }
        builder.build()
    }

    /// Gives `request` the kwargs a matched URL pattern would. A non-object
    /// `kwargs` gives an empty mapping.
    pub fn with_kwargs(request: &mut HttpRequest, kwargs: Value) {
        let kwargs = match kwargs {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        request.set_resolver_match(ResolverMatch::new(noop_handler(), kwargs));
    }
}

fn noop_handler() -> RouteHandler {
    Arc::new(|_req: HttpRequest| -> BoxFuture { Box::pin(async { Ok(HttpResponse::ok("")) }) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_request() {
        let request = RequestFactory::new().get("/articles/");
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/articles/");
        assert!(request.method_flags().is_none());
        assert!(request.kwargs().is_empty());
    }

    #[test]
    fn test_method_flags() {
        let factory = RequestFactory::new().with_method_flags();
        assert!(factory.head("/").is_head());
        assert!(factory.delete("/").is_delete());
        assert!(!factory.get("/").is_post());
    }

    #[test]
    fn test_post_json() {
        let request = RequestFactory::new().post_json("/api", &json!({"a": 1}));
        assert_eq!(request.body(), br#"{"a":1}"#);
        assert_eq!(
            request.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_default_header() {
        let request = RequestFactory::new()
            .with_default_header("x-test", "1")
            .get("/");
        assert_eq!(request.headers().get("x-test").unwrap(), "1");
    }

    #[test]
    fn test_with_kwargs() {
        let mut request = RequestFactory::new().get("/");
        RequestFactory::with_kwargs(&mut request, json!({"pattern_name": "home", "permanent": true}));
        assert_eq!(request.kwarg_str("pattern_name"), Some("home"));
        assert_eq!(request.kwarg("permanent"), Some(&json!(true)));

        RequestFactory::with_kwargs(&mut request, json!(3));
        assert!(request.kwargs().is_empty());
    }

    #[test]
    fn test_with_urlconf() {
        let request = RequestFactory::new()
            .with_urlconf(Arc::new(URLConf::default()))
            .get("/");
        assert!(request.urlconf().is_some());
    }
}
