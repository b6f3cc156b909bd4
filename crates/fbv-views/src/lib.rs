//! # fbv-views
//!
//! View layer for fbv-rs. Views are async functions returning a
//! [`ViewOutput`]; decorators turn mapping outputs into HTML or JSON
//! responses.
//!
//! ## Modules
//!
//! - [`output`] - [`ViewOutput`], [`ViewName`] and the view function types
//! - [`decorators`] - [`render_html`](decorators::render_html),
//!   [`RenderView`](decorators::RenderView), [`render_json`](decorators::render_json)
//!   and [`RenderJson`](decorators::RenderJson)
//! - [`middleware`] - the middleware pipeline and [`RequestMethodMiddleware`](middleware::method::RequestMethodMiddleware)
//! - [`views`] - method and cache-control wrappers plus the built-in views
//! - [`server`] - [`App`](server::App), which serves a URL configuration with axum

pub mod decorators;
pub mod middleware;
pub mod output;
pub mod server;
pub mod views;

pub use output::{into_handler, view, ViewFunction, ViewFuture, ViewName, ViewOutput};
