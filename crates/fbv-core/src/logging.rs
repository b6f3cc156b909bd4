//! Tracing setup for fbv-rs applications.
//!
//! [`setup_logging`] installs the global subscriber from [`Settings`];
//! [`request_span`] opens the span every request is handled inside.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Installs the global tracing subscriber.
///
/// `settings.log_level` is parsed as an [`EnvFilter`] directive and falls back
/// to `info` when invalid. Debug mode writes pretty, human-readable output;
/// otherwise each event is a JSON line. Calling this more than once is a no-op.
pub fn setup_logging(settings: &Settings) {
    let filter = build_filter(&settings.log_level);

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Creates the span a single HTTP request is processed in.
///
/// # Examples
///
/// ```
/// use fbv_core::logging::request_span;
///
/// let span = request_span("3f1c", "GET", "/robots.txt");
/// let _guard = span.enter();
/// tracing::info!("handling request");
/// ```
pub fn request_span(request_id: &str, method: &str, path: &str) -> tracing::Span {
    tracing::info_span!("request", id = request_id, method = method, path = path)
}
