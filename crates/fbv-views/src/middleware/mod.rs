//! Middleware framework.
//!
//! A [`Middleware`] sees every request before it reaches the view and every
//! response on the way out. [`MiddlewarePipeline`] runs them Django-style:
//! requests in the order the middleware was added, responses and errors in
//! reverse.

pub mod method;

use async_trait::async_trait;

use fbv_core::FbvError;
use fbv_http::{BoxFuture, HttpRequest, HttpResponse};

/// The handler at the center of the pipeline.
pub type ViewHandler = Box<dyn Fn(HttpRequest) -> BoxFuture + Send + Sync>;

/// A component that can inspect requests, responses and errors.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use fbv_core::FbvError;
/// use fbv_http::{HttpRequest, HttpResponse};
/// use fbv_views::middleware::Middleware;
///
/// struct Passthrough;
///
/// #[async_trait]
/// impl Middleware for Passthrough {
///     async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
///         None
///     }
///
///     async fn process_response(&self, _request: &HttpRequest, response: HttpResponse) -> HttpResponse {
///         response
///     }
///
///     async fn process_exception(&self, _request: &HttpRequest, _error: &FbvError) -> Option<HttpResponse> {
///         None
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs before the view. Returning a response skips the view and the
    /// remaining middleware.
    async fn process_request(&self, request: &mut HttpRequest) -> Option<HttpResponse>;

    /// Runs after the view, in reverse order.
    async fn process_response(&self, request: &HttpRequest, response: HttpResponse)
        -> HttpResponse;

    /// Runs, in reverse order, when the view returned an error. The first
    /// response returned replaces the error.
    async fn process_exception(&self, request: &HttpRequest, error: &FbvError)
        -> Option<HttpResponse>;
}

/// An ordered list of middleware around a view handler.
pub struct MiddlewarePipeline {
    middlewares: Vec<Box<dyn Middleware>>,
    debug: bool,
}

impl Default for MiddlewarePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewarePipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
            debug: false,
        }
    }

    /// Appends a middleware.
    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Sets whether unhandled error responses include the error message.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Returns the number of middleware.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if there is no middleware.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs `request` through the middleware and `handler`.
    ///
    /// 1. `process_request` in order; a response short-circuits and only the
    ///    middleware that already ran see it in `process_response`.
    /// 2. The handler, given a copy of the request as the middleware left it.
    /// 3. On error, `process_exception` in reverse order; if none handles it
    ///    the error becomes a response with its status code.
    /// 4. `process_response` in reverse order.
    pub async fn process(&self, mut request: HttpRequest, handler: &ViewHandler) -> HttpResponse {
        for (i, mw) in self.middlewares.iter().enumerate() {
            if let Some(response) = mw.process_request(&mut request).await {
                let mut resp = response;
                for earlier in self.middlewares[..=i].iter().rev() {
                    resp = earlier.process_response(&request, resp).await;
                }
                return resp;
            }
        }

        let response = match handler(request.clone()).await {
            Ok(response) => response,
            Err(error) => self.handle_error(&request, &error).await,
        };

        let mut resp = response;
        for mw in self.middlewares.iter().rev() {
            resp = mw.process_response(&request, resp).await;
        }
        resp
    }

    async fn handle_error(&self, request: &HttpRequest, error: &FbvError) -> HttpResponse {
        for mw in self.middlewares.iter().rev() {
            if let Some(response) = mw.process_exception(request, error).await {
                return response;
            }
        }
        if error.status_code() >= 500 {
            tracing::error!(error = %error, path = request.path(), "unhandled view error");
        } else {
            tracing::warn!(error = %error, path = request.path(), "request failed");
        }
        HttpResponse::from_error(error, self.debug)
    }
}

impl std::fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("middleware_count", &self.middlewares.len())
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use http::StatusCode;

    struct Tracker {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Middleware for Tracker {
        async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
            self.log.lock().unwrap().push(format!("request:{}", self.name));
            None
        }

        async fn process_response(
            &self,
            _request: &HttpRequest,
            response: HttpResponse,
        ) -> HttpResponse {
            self.log.lock().unwrap().push(format!("response:{}", self.name));
            response
        }

        async fn process_exception(
            &self,
            _request: &HttpRequest,
            _error: &FbvError,
        ) -> Option<HttpResponse> {
            self.log.lock().unwrap().push(format!("exception:{}", self.name));
            None
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Middleware for ShortCircuit {
        async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
            Some(HttpResponse::new(StatusCode::FORBIDDEN, "Blocked"))
        }

        async fn process_response(
            &self,
            _request: &HttpRequest,
            response: HttpResponse,
        ) -> HttpResponse {
            response
        }

        async fn process_exception(
            &self,
            _request: &HttpRequest,
            _error: &FbvError,
        ) -> Option<HttpResponse> {
            None
        }
    }

    struct Rescue;

    #[async_trait]
    impl Middleware for Rescue {
        async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
            None
        }

        async fn process_response(
            &self,
            _request: &HttpRequest,
            response: HttpResponse,
        ) -> HttpResponse {
            response
        }

        async fn process_exception(
            &self,
            _request: &HttpRequest,
            error: &FbvError,
        ) -> Option<HttpResponse> {
            Some(HttpResponse::ok(format!("rescued: {error}")))
        }
    }

    fn ok_handler() -> ViewHandler {
        Box::new(|_req: HttpRequest| -> BoxFuture {
            Box::pin(async { Ok(HttpResponse::ok("view response")) })
        })
    }

    fn failing_handler() -> ViewHandler {
        Box::new(|_req: HttpRequest| -> BoxFuture {
            Box::pin(async { Err(FbvError::NotFound("gone".into())) })
        })
    }

    fn tracked(log: &Arc<Mutex<Vec<String>>>) -> MiddlewarePipeline {
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(Tracker { name: "A", log: log.clone() });
        pipeline.add(Tracker { name: "B", log: log.clone() });
        pipeline
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let pipeline = MiddlewarePipeline::new();
        assert!(pipeline.is_empty());
        let response = pipeline
            .process(HttpRequest::builder().build(), &ok_handler())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = tracked(&log);
        assert_eq!(pipeline.len(), 2);
        pipeline
            .process(HttpRequest::builder().build(), &ok_handler())
            .await;
        assert_eq!(
            *log.lock().unwrap(),
            ["request:A", "request:B", "response:B", "response:A"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_later_middleware() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(Tracker { name: "A", log: log.clone() });
        pipeline.add(ShortCircuit);
        pipeline.add(Tracker { name: "C", log: log.clone() });

        let response = pipeline
            .process(HttpRequest::builder().build(), &ok_handler())
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(*log.lock().unwrap(), ["request:A", "response:A"]);
    }

    #[tokio::test]
    async fn test_unhandled_error_becomes_status() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = tracked(&log);
        let response = pipeline
            .process(HttpRequest::builder().build(), &failing_handler())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.content_bytes().unwrap(), b"Not Found");
        assert_eq!(
            *log.lock().unwrap(),
            [
                "request:A",
                "request:B",
                "exception:B",
                "exception:A",
                "response:B",
                "response:A"
            ]
        );
    }

    #[tokio::test]
    async fn test_debug_error_body() {
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.set_debug(true);
        let response = pipeline
            .process(HttpRequest::builder().build(), &failing_handler())
            .await;
        assert_eq!(response.content_bytes().unwrap(), b"Not found: gone");
    }

    #[tokio::test]
    async fn test_exception_hook_replaces_error() {
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(Rescue);
        let response = pipeline
            .process(HttpRequest::builder().build(), &failing_handler())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_bytes().unwrap(), b"rescued: Not found: gone");
    }
}
