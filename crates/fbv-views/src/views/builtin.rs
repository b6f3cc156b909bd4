//! Ready-made views configured entirely through bound URL kwargs.
//!
//! ```
//! use fbv_core::Settings;
//! use fbv_http::urls::{path, URLConf};
//! use fbv_views::into_handler;
//! use fbv_views::views::builtin::{favicon_emoji, redirect_view};
//! use serde_json::json;
//!
//! let settings = Settings::default();
//! let urls = URLConf::new(vec![
//!     path("favicon.ico", into_handler(favicon_emoji(&settings)), None)
//!         .unwrap()
//!         .kwargs(json!({"emoji": "✨"})),
//!     path("old", into_handler(redirect_view()), None)
//!         .unwrap()
//!         .kwargs(json!({"pattern_name": "home", "permanent": true})),
//! ]);
//! # let _ = urls;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;

use fbv_core::{FbvError, Settings};
use fbv_http::{FileResponse, HttpRequest, HttpResponse, HttpResponsePermanentRedirect, HttpResponseRedirect};
use fbv_template::{Context, TemplateRenderer};

use super::function::{cache_control, require_get, CacheControl};
use crate::decorators::{render_html, TEMPLATE_KEY};
use crate::output::{view, ViewFunction, ViewName, ViewOutput};

/// Renders a template given by the `template_name` kwarg with the `context`
/// kwarg as its context.
pub fn html_view(renderer: Arc<dyn TemplateRenderer>) -> ViewFunction {
    let inner = view(|request: HttpRequest| async move {
        let mut context = match request.kwarg("context") {
            Some(Value::Object(map)) => Context::from(map.clone()),
            Some(Value::Null) | None => Context::new(),
            Some(other) => {
                return Err(FbvError::ImproperlyConfigured(format!(
                    "html_view context must be an object, got {other}"
                )))
            }
        };
        if let Some(template_name) = request.kwarg_str("template_name") {
            context.insert(TEMPLATE_KEY, template_name);
        }
        Ok(ViewOutput::Context(context))
    });
    render_html(renderer, ViewName::new("fbv.views", "html_view"), inner)
}

/// Redirects to the URL reversed from the `pattern_name` kwarg.
///
/// `permanent: true` gives a 301, otherwise 302. Every other kwarg and the
/// positional arguments are used to reverse the pattern.
pub fn redirect_view() -> ViewFunction {
    view(|request: HttpRequest| async move {
        let pattern_name = request
            .kwarg_str("pattern_name")
            .ok_or_else(|| {
                FbvError::ImproperlyConfigured("redirect_view requires a pattern_name kwarg".into())
            })?
            .to_string();
        let permanent = request
            .kwarg("permanent")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut kwargs = request.kwargs();
        kwargs.remove("pattern_name");
        kwargs.remove("permanent");

        let url = request.reverse(&pattern_name, request.args(), &kwargs)?;
        tracing::debug!(pattern_name = %pattern_name, url = %url, permanent, "redirecting");

        let response = if permanent {
            HttpResponsePermanentRedirect::new(&url)
        } else {
            HttpResponseRedirect::new(&url)
        };
        Ok(ViewOutput::Response(response))
    })
}

/// Streams the file named by the `file_path` kwarg, relative to
/// [`Settings::base_dir`]. GET only, cached for
/// [`Settings::static_max_age`] seconds.
pub fn file_view(settings: &Settings) -> ViewFunction {
    let base_dir = Arc::new(settings.base_dir.clone());
    let inner = view(move |request: HttpRequest| {
        let base_dir = base_dir.clone();
        async move {
            let file_path = request.kwarg_str("file_path").ok_or_else(|| {
                FbvError::ImproperlyConfigured("file_view requires a file_path kwarg".into())
            })?;
            let full_path: PathBuf = base_dir.join(file_path);
            Ok(ViewOutput::Response(FileResponse::open(&full_path).await?))
        }
    });
    static_file(settings, inner)
}

/// [`file_view`] under the name used for favicon routes.
pub fn favicon_file(settings: &Settings) -> ViewFunction {
    file_view(settings)
}

/// Serves the `emoji` kwarg as an SVG favicon.
pub fn favicon_emoji(settings: &Settings) -> ViewFunction {
    let inner = view(|request: HttpRequest| async move {
        let emoji = request.kwarg_str("emoji").ok_or_else(|| {
            FbvError::ImproperlyConfigured("favicon_emoji requires an emoji kwarg".into())
        })?;
        let mut response = HttpResponse::new(StatusCode::OK, emoji_svg(emoji));
        response.set_content_type("image/svg+xml");
        Ok(ViewOutput::Response(response))
    });
    static_file(settings, inner)
}

fn emoji_svg(emoji: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 100\">\n\
         <text y=\".9em\" font-size=\"90\">{emoji}</text>\n\
         </svg>"
    )
}

fn static_file(settings: &Settings, view: ViewFunction) -> ViewFunction {
    require_get(cache_control(
        CacheControl::immutable_public(settings.static_max_age),
        view,
    ))
}
