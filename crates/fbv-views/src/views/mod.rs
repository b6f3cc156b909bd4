//! View wrappers and built-in views.
//!
//! - [`function`] - method restriction and `Cache-Control` wrappers
//! - [`builtin`] - template, redirect, file and favicon views driven by
//!   bound URL kwargs

pub mod builtin;
pub mod function;

pub use builtin::{favicon_emoji, favicon_file, file_view, html_view, redirect_view};
pub use function::{cache_control, require_get, require_http_methods, require_post, CacheControl};
