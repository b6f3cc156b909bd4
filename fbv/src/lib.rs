//! # fbv
//!
//! Function-based view helpers for Rust web apps.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on `fbv` to
//! get everything, or on the individual crates for finer-grained control.
//!
//! ```no_run
//! use fbv::prelude::*;
//! use fbv::serde_json::json;
//!
//! # async fn example() -> Result<(), FbvError> {
//! let settings = Settings::default();
//! let renderer: std::sync::Arc<dyn TemplateRenderer> =
//!     std::sync::Arc::new(Engine::from_settings(&settings)?);
//!
//! let home = RenderView::html(renderer, "home.html").wrap(
//!     view_name!(home),
//!     view(|req: HttpRequest| async move {
//!         Ok(ViewOutput::from(json!({"posted": req.is_post()})))
//!     }),
//! );
//! let urls = URLConf::new(vec![path("", into_handler(home), Some("home"))?]);
//!
//! App::new(settings)
//!     .urls(urls)
//!     .middleware(RequestMethodMiddleware)
//!     .run("127.0.0.1:8000")
//!     .await
//! # }
//! ```

/// Errors, settings and logging setup.
pub use fbv_core as core;

/// Model records and query sets for the JSON decorator.
#[cfg(feature = "db")]
pub use fbv_db as db;

/// Requests, responses, JSON encoding and URL routing.
#[cfg(feature = "http")]
pub use fbv_http as http;

/// The tera-backed template engine.
#[cfg(feature = "template")]
pub use fbv_template as template;

/// Render decorators, middleware, built-in views and the server.
#[cfg(feature = "views")]
pub use fbv_views as views;

/// Request factory and test client.
#[cfg(feature = "testing")]
pub use fbv_test as test;

#[cfg(feature = "views")]
pub use fbv_views::view_name;

// Third-party crates that appear in the public API.
pub use async_trait;
pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// The names most applications need.
#[cfg(feature = "views")]
pub mod prelude {
    pub use fbv_core::{FbvError, FbvResult, Settings};
    pub use fbv_db::{Model, ModelRecord, QuerySet};
    pub use fbv_http::urls::{path, re_path, URLConf};
    pub use fbv_http::{HttpRequest, HttpResponse, JsonResponse};
    pub use fbv_template::{Context, Engine, TemplateRenderer};
    pub use fbv_views::decorators::{render_html, render_json, RenderJson, RenderView};
    pub use fbv_views::middleware::method::RequestMethodMiddleware;
    pub use fbv_views::server::App;
    pub use fbv_views::views::{
        cache_control, favicon_emoji, favicon_file, file_view, html_view, redirect_view,
        require_get, require_http_methods, CacheControl,
    };
    pub use fbv_views::{into_handler, view, view_name, ViewFunction, ViewName, ViewOutput};
}

#[cfg(all(test, feature = "views"))]
mod tests {
    use crate::prelude::*;

    #[tokio::test]
    async fn test_reexported_crates_build_a_json_view() {
        let data = render_json(view(|_req: HttpRequest| async {
            Ok(ViewOutput::from(crate::serde_json::json!({"test": 123})))
        }));
        let response = data(HttpRequest::builder().build())
            .await
            .unwrap()
            .into_response()
            .unwrap();
        assert_eq!(response.content_bytes().unwrap(), br#"{"test":123}"#);

        let _router: crate::axum::Router = App::new(Settings::default()).into_axum_router();
        crate::tracing::debug!("re-exported tracing is usable");
    }
}
