//! Decorators for restricting methods and setting cache headers.
//!
//! These mirror Django's `@require_http_methods`, `@require_GET` and
//! `@cache_control` and compose with the render decorators.
//!
//! # Examples
//!
//! ```
//! use fbv_http::{HttpRequest, HttpResponse};
//! use fbv_views::views::function::{cache_control, require_get, CacheControl};
//! use fbv_views::{view, ViewOutput};
//!
//! let robots = view(|_req: HttpRequest| async {
//!     Ok(ViewOutput::from(HttpResponse::ok("User-agent: *")))
//! });
//! let robots = require_get(cache_control(CacheControl::immutable_public(86_400), robots));
//! # let _ = robots;
//! ```

use std::sync::Arc;

use http::header::{HeaderValue, CACHE_CONTROL};

use fbv_http::{HttpRequest, HttpResponse};

use crate::output::{ViewFunction, ViewFuture, ViewOutput};

/// Wraps `view` so that only the listed methods reach it; any other method
/// gets a 405 response with an `Allow` header.
pub fn require_http_methods(methods: &[&str], view: ViewFunction) -> ViewFunction {
    let allowed: Arc<Vec<String>> = Arc::new(methods.iter().map(|m| m.to_uppercase()).collect());

    Arc::new(move |request: HttpRequest| -> ViewFuture {
        let allowed = allowed.clone();
        let view = view.clone();

        Box::pin(async move {
            let method = request.method().as_str();
            if allowed.iter().any(|m| m == method) {
                view(request).await
            } else {
                tracing::warn!(method, path = request.path(), "Method Not Allowed");
                let names: Vec<&str> = allowed.iter().map(String::as_str).collect();
                Ok(ViewOutput::Response(HttpResponse::not_allowed(&names)))
            }
        })
    })
}

/// Allows only GET, like Django's `require_GET`.
pub fn require_get(view: ViewFunction) -> ViewFunction {
    require_http_methods(&["GET"], view)
}

/// Allows only POST.
pub fn require_post(view: ViewFunction) -> ViewFunction {
    require_http_methods(&["POST"], view)
}

/// Directives for a `Cache-Control` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    /// `max-age=<seconds>`.
    pub max_age: Option<u64>,
    /// `immutable`.
    pub immutable: bool,
    /// `public`.
    pub public: bool,
    /// `private`.
    pub private: bool,
    /// `no-cache`.
    pub no_cache: bool,
    /// `no-store`.
    pub no_store: bool,
    /// `must-revalidate`.
    pub must_revalidate: bool,
}

impl CacheControl {
    /// `max-age=<max_age>, immutable, public`, the policy for static files.
    pub fn immutable_public(max_age: u64) -> Self {
        Self {
            max_age: Some(max_age),
            immutable: true,
            public: true,
            ..Self::default()
        }
    }

    /// The header value, directives separated by `", "`.
    pub fn header_value(&self) -> String {
        let mut directives = Vec::new();
        if let Some(max_age) = self.max_age {
            directives.push(format!("max-age={max_age}"));
        }
        let flags = [
            (self.immutable, "immutable"),
            (self.public, "public"),
            (self.private, "private"),
            (self.no_cache, "no-cache"),
            (self.no_store, "no-store"),
            (self.must_revalidate, "must-revalidate"),
        ];
        directives.extend(
            flags
                .iter()
                .filter(|(on, _)| *on)
                .map(|(_, name)| (*name).to_string()),
        );
        directives.join(", ")
    }
}

/// Wraps `view` so that its response carries `policy` as `Cache-Control`.
/// Outputs that are not responses pass through.
pub fn cache_control(policy: CacheControl, view: ViewFunction) -> ViewFunction {
    let value = HeaderValue::from_str(&policy.header_value()).ok();

    Arc::new(move |request: HttpRequest| -> ViewFuture {
        let value = value.clone();
        let view = view.clone();

        Box::pin(async move {
            match view(request).await? {
                ViewOutput::Response(mut response) => {
                    if let Some(value) = value {
                        response.headers_mut().insert(CACHE_CONTROL, value);
                    }
                    Ok(ViewOutput::Response(response))
                }
                other => Ok(other),
            }
        })
    })
}
