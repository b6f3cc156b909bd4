//! Serving a URL configuration over HTTP.
//!
//! [`App`] combines a [`URLConf`], a middleware pipeline, settings and an
//! optional template engine, and turns them into an axum router.
//!
//! # Examples
//!
//! ```no_run
//! use fbv_core::Settings;
//! use fbv_http::urls::{path, URLConf};
//! use fbv_http::{HttpRequest, HttpResponse};
//! use fbv_views::middleware::method::RequestMethodMiddleware;
//! use fbv_views::server::App;
//! use fbv_views::{into_handler, view, ViewOutput};
//!
//! # async fn example() -> Result<(), fbv_core::FbvError> {
//! let hello = into_handler(view(|req: HttpRequest| async move {
//!     Ok(ViewOutput::from(HttpResponse::ok(format!("GET? {}", req.is_get()))))
//! }));
//! let urls = URLConf::new(vec![path("", hello, Some("home"))?]);
//!
//! App::new(Settings::default())
//!     .urls(urls)
//!     .middleware(RequestMethodMiddleware)
//!     .run("127.0.0.1:8000")
//!     .await
//! # }
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::any;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use fbv_core::logging::request_span;
use fbv_core::{FbvError, Settings};
use fbv_http::urls::URLConf;
use fbv_http::{BoxFuture, HttpRequest};
use fbv_template::{Engine, TemplateRenderer};

use crate::middleware::{Middleware, MiddlewarePipeline, ViewHandler};

/// A runnable application.
pub struct App {
    url_conf: Option<URLConf>,
    middleware: MiddlewarePipeline,
    settings: Settings,
    engine: Option<Arc<Engine>>,
}

impl App {
    /// Creates an application with no URLs and no middleware.
    pub fn new(settings: Settings) -> Self {
        let mut middleware = MiddlewarePipeline::new();
        middleware.set_debug(settings.debug);
        Self {
            url_conf: None,
            middleware,
            settings,
            engine: None,
        }
    }

    /// Sets the URL configuration.
    #[must_use]
    pub fn urls(mut self, url_conf: URLConf) -> Self {
        self.url_conf = Some(url_conf);
        self
    }

    /// Appends a middleware.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.add(middleware);
        self
    }

    /// Sets the template engine.
    #[must_use]
    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Returns the settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the template engine, if one was set.
    pub const fn template_engine(&self) -> Option<&Arc<Engine>> {
        self.engine.as_ref()
    }

    /// Returns the template engine as a renderer for the HTML decorator.
    pub fn renderer(&self) -> Option<Arc<dyn TemplateRenderer>> {
        self.engine
            .clone()
            .map(|engine| engine as Arc<dyn TemplateRenderer>)
    }

    /// Returns `true` if URLs have been set.
    pub const fn has_urls(&self) -> bool {
        self.url_conf.is_some()
    }

    /// Returns the number of middleware.
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Builds the axum router.
    ///
    /// Every request gets a fresh request id and span, passes through the
    /// middleware, is resolved against the URL configuration and handed to
    /// the matching view. Routing misses and view errors become responses
    /// through the middleware's exception hooks.
    pub fn into_axum_router(self) -> axum::Router {
        let url_conf = self.url_conf.map(Arc::new);
        let middleware = Arc::new(self.middleware);

        let handler = move |req: Request<Body>| {
            let url_conf = url_conf.clone();
            let middleware = middleware.clone();

            let request_id = uuid::Uuid::new_v4().to_string();
            let span = request_span(&request_id, req.method().as_str(), req.uri().path());

            async move {
                let (parts, body) = req.into_parts();
                let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read request body");
                        Vec::new()
                    }
                };
                let request = HttpRequest::from_axum(parts, body_bytes);

                let view_handler: ViewHandler = Box::new(move |request: HttpRequest| -> BoxFuture {
                    let url_conf = url_conf.clone();
                    Box::pin(dispatch(url_conf, request))
                });

                let response = middleware.process(request, &view_handler).await;
                tracing::info!(status = response.status().as_u16(), "request finished");
                response.into_response()
            }
            .instrument(span)
        };

        axum::Router::new()
            .route("/{*path}", any(handler.clone()))
            .route("/", any(handler))
            .layer(TraceLayer::new_for_http())
    }

    /// Serves the application on `addr` until the process is stopped.
    ///
    /// # Errors
    ///
    /// [`FbvError::ImproperlyConfigured`] if the address cannot be bound;
    /// [`FbvError::InternalServerError`] if the server fails.
    pub async fn run(self, addr: &str) -> Result<(), FbvError> {
        let debug = self.settings.debug;
        let router = self.into_axum_router();
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            FbvError::ImproperlyConfigured(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        } else {
            tracing::info!(addr, "listening");
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| FbvError::InternalServerError(format!("Server error: {e}")))?;

        Ok(())
    }
}

async fn dispatch(
    url_conf: Option<Arc<URLConf>>,
    mut request: HttpRequest,
) -> fbv_core::FbvResult<fbv_http::HttpResponse> {
    let url_conf = url_conf.ok_or_else(|| {
        FbvError::ImproperlyConfigured("No URL configuration provided".to_string())
    })?;

    let resolver_match = url_conf.resolve(request.path())?;
    let func = resolver_match.func.clone();
    request.set_resolver_match(resolver_match);
    request.set_urlconf(url_conf);
    func(request).await
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("has_urls", &self.url_conf.is_some())
            .field("middleware_count", &self.middleware.len())
            .field("has_engine", &self.engine.is_some())
            .field("debug", &self.settings.debug)
            .finish()
    }
}
