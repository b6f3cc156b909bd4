//! HTTP request type.
//!
//! [`HttpRequest`] gives views access to the method, path, headers, query
//! parameters and body of a request, plus two things the framework attaches
//! while routing: the [`ResolverMatch`] with the view's keyword arguments and
//! the URL configuration used for `reverse`. The method-flagging middleware
//! stores [`MethodFlags`] on it, derived from the request method.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Method};
use percent_encoding::percent_decode_str;

use fbv_core::{FbvError, FbvResult};

use crate::urls::resolver::{ResolverMatch, URLConf};

/// One boolean per HTTP method, computed once per request.
///
/// # Examples
///
/// ```
/// use fbv_http::MethodFlags;
///
/// let flags = MethodFlags::for_method("PATCH");
/// assert!(flags.is_patch);
/// assert!(!flags.is_get);
///
/// let flags = MethodFlags::for_method("get");
/// assert_eq!(flags, MethodFlags::default());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MethodFlags {
    pub is_get: bool,
    pub is_post: bool,
    pub is_put: bool,
    pub is_patch: bool,
    pub is_delete: bool,
    pub is_head: bool,
    pub is_connect: bool,
    pub is_trace: bool,
}

impl MethodFlags {
    /// Computes the flags for a method name. The comparison is case-sensitive:
    /// only upper-case names set a flag.
    pub fn for_method(method: &str) -> Self {
        Self {
            is_get: method == "GET",
            is_post: method == "POST",
            is_put: method == "PUT",
            is_patch: method == "PATCH",
            is_delete: method == "DELETE",
            is_head: method == "HEAD",
            is_connect: method == "CONNECT",
            is_trace: method == "TRACE",
        }
    }

    /// Returns the flags as `(name, value)` pairs, e.g. `("is_get", true)`.
    pub const fn as_pairs(&self) -> [(&'static str, bool); 8] {
        [
            ("is_get", self.is_get),
            ("is_post", self.is_post),
            ("is_put", self.is_put),
            ("is_patch", self.is_patch),
            ("is_delete", self.is_delete),
            ("is_head", self.is_head),
            ("is_connect", self.is_connect),
            ("is_trace", self.is_trace),
        ]
    }
}

/// An HTTP request.
///
/// Cloning a request is cheap enough for the middleware pipeline: the URL
/// configuration is shared behind an `Arc`.
///
/// # Examples
///
/// ```
/// use fbv_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/articles/2024/")
///     .query_string("page=1")
///     .build();
///
/// assert_eq!(request.method(), &http::Method::GET);
/// assert_eq!(request.path(), "/articles/2024/");
/// assert_eq!(request.query_param("page").as_deref(), Some("1"));
/// assert!(request.method_flags().is_none());
/// ```
#[derive(Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    body: Vec<u8>,
    resolver_match: Option<ResolverMatch>,
    urlconf: Option<Arc<URLConf>>,
    method_flags: Option<MethodFlags>,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query_string", &self.query_string)
            .field("resolver_match", &self.resolver_match)
            .field("method_flags", &self.method_flags)
            .finish_non_exhaustive()
    }
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from the parts of an incoming axum request and
    /// its body bytes.
    pub fn from_axum(parts: http::request::Parts, body: Vec<u8>) -> Self {
        let path = parts.uri.path().to_string();
        let query_string = parts.uri.query().unwrap_or("").to_string();

        let mut meta = HashMap::new();
        for (name, value) in &parts.headers {
            if let Ok(v) = value.to_str() {
                let key = format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_"));
                meta.insert(key, v.to_string());
            }
        }
        meta.insert("REQUEST_METHOD".to_string(), parts.method.to_string());
        meta.insert("PATH_INFO".to_string(), path.clone());
        meta.insert("QUERY_STRING".to_string(), query_string.clone());
        meta.insert("CONTENT_LENGTH".to_string(), body.len().to_string());

        Self {
            method: parts.method,
            path,
            query_string,
            headers: parts.headers,
            meta,
            body,
            resolver_match: None,
            urlconf: None,
            method_flags: None,
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the first value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_string
            .split('&')
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| decode_component(key) == name)
            .map(|(_, value)| decode_component(value))
    }

    /// Returns the full path including the query string.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the META dictionary (`REQUEST_METHOD`, `PATH_INFO`, `HTTP_*`, ...).
    pub const fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    /// Returns the raw request body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    // ── Method flags ─────────────────────────────────────────────────

    /// Returns the method flags, or `None` if the method-flagging middleware
    /// has not run for this request.
    pub const fn method_flags(&self) -> Option<&MethodFlags> {
        self.method_flags.as_ref()
    }

    /// Stores the flags computed from this request's method, replacing any
    /// flags already present.
    pub fn set_method_flags(&mut self) {
        self.method_flags = Some(MethodFlags::for_method(self.method.as_str()));
    }

    fn flag(&self, pick: fn(&MethodFlags) -> bool) -> bool {
        self.method_flags.as_ref().is_some_and(pick)
    }

    /// `true` if the flags were set and the method is `GET`.
    pub fn is_get(&self) -> bool {
        self.flag(|f| f.is_get)
    }

    /// `true` if the flags were set and the method is `POST`.
    pub fn is_post(&self) -> bool {
        self.flag(|f| f.is_post)
    }

    /// `true` if the flags were set and the method is `PUT`.
    pub fn is_put(&self) -> bool {
        self.flag(|f| f.is_put)
    }

    /// `true` if the flags were set and the method is `PATCH`.
    pub fn is_patch(&self) -> bool {
        self.flag(|f| f.is_patch)
    }

    /// `true` if the flags were set and the method is `DELETE`.
    pub fn is_delete(&self) -> bool {
        self.flag(|f| f.is_delete)
    }

    /// `true` if the flags were set and the method is `HEAD`.
    pub fn is_head(&self) -> bool {
        self.flag(|f| f.is_head)
    }

    /// `true` if the flags were set and the method is `CONNECT`.
    pub fn is_connect(&self) -> bool {
        self.flag(|f| f.is_connect)
    }

    /// `true` if the flags were set and the method is `TRACE`.
    pub fn is_trace(&self) -> bool {
        self.flag(|f| f.is_trace)
    }

    // ── Routing ──────────────────────────────────────────────────────

    /// Returns the resolver match, if the URL has been resolved.
    pub const fn resolver_match(&self) -> Option<&ResolverMatch> {
        self.resolver_match.as_ref()
    }

    /// Sets the resolver match on this request.
    pub fn set_resolver_match(&mut self, resolver_match: ResolverMatch) {
        self.resolver_match = Some(resolver_match);
    }

    /// Returns the view's keyword arguments: captured URL values merged with
    /// the pattern's bound kwargs. Empty before resolution.
    pub fn kwargs(&self) -> serde_json::Map<String, serde_json::Value> {
        self.resolver_match
            .as_ref()
            .map(|m| m.kwargs.clone())
            .unwrap_or_default()
    }

    /// Returns one keyword argument.
    pub fn kwarg(&self, name: &str) -> Option<&serde_json::Value> {
        self.resolver_match.as_ref()?.kwargs.get(name)
    }

    /// Returns a keyword argument as a string, if it is one.
    pub fn kwarg_str(&self, name: &str) -> Option<&str> {
        self.kwarg(name).and_then(serde_json::Value::as_str)
    }

    /// Returns the view's positional arguments.
    pub fn args(&self) -> &[String] {
        self.resolver_match
            .as_ref()
            .map_or(&[], |m| m.args.as_slice())
    }

    /// Returns the URL configuration the request was resolved against.
    pub fn urlconf(&self) -> Option<&Arc<URLConf>> {
        self.urlconf.as_ref()
    }

    /// Sets the URL configuration used by [`HttpRequest::reverse`].
    pub fn set_urlconf(&mut self, urlconf: Arc<URLConf>) {
        self.urlconf = Some(urlconf);
    }

    /// Reverses a named pattern against the request's URL configuration.
    pub fn reverse(
        &self,
        viewname: &str,
        args: &[String],
        kwargs: &serde_json::Map<String, serde_json::Value>,
    ) -> FbvResult<String> {
        let urlconf = self.urlconf.as_ref().ok_or_else(|| {
            FbvError::NoReverseMatch(format!("{viewname} (no URL configuration)"))
        })?;
        urlconf.reverse(viewname, args, kwargs)
    }
}

fn decode_component(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Builder for constructing [`HttpRequest`] instances in tests.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    meta: HashMap<String, String>,
    body: Vec<u8>,
    resolver_match: Option<ResolverMatch>,
    urlconf: Option<Arc<URLConf>>,
    method_flags: Option<MethodFlags>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            meta: HashMap::new(),
            body: Vec::new(),
            resolver_match: None,
            urlconf: None,
            method_flags: None,
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Adds a META entry.
    #[must_use]
    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Attaches a resolver match.
    #[must_use]
    pub fn resolver_match(mut self, resolver_match: ResolverMatch) -> Self {
        self.resolver_match = Some(resolver_match);
        self
    }

    /// Attaches the URL configuration used for `reverse`.
    #[must_use]
    pub fn urlconf(mut self, urlconf: Arc<URLConf>) -> Self {
        self.urlconf = Some(urlconf);
        self
    }

    /// Presets the method flags, as if the middleware had already run.
    #[must_use]
    pub fn method_flags(mut self, flags: MethodFlags) -> Self {
        self.method_flags = Some(flags);
        self
    }

    /// Builds the [`HttpRequest`].
    pub fn build(self) -> HttpRequest {
        let mut meta = self.meta;
        meta.entry("REQUEST_METHOD".to_string())
            .or_insert_with(|| self.method.to_string());
        meta.entry("PATH_INFO".to_string())
            .or_insert_with(|| self.path.clone());
        meta.entry("QUERY_STRING".to_string())
            .or_insert_with(|| self.query_string.clone());

        HttpRequest {
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            headers: self.headers,
            meta,
            body: self.body,
            resolver_match: self.resolver_match,
            urlconf: self.urlconf,
            method_flags: self.method_flags,
        }
    }
}
