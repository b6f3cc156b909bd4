//! # fbv-http
//!
//! HTTP layer for fbv-rs. Provides the request and response types views work
//! with, JSON encoding with configurable separators, and Django-style URL
//! routing with named patterns and `reverse`.
//!
//! ## Modules
//!
//! - [`request`] - [`HttpRequest`] and the per-request [`MethodFlags`]
//! - [`response`] - [`HttpResponse`], redirects and streamed file responses
//! - [`json`] - [`Separators`] and the [`JsonEncoder`] behind JSON responses
//! - [`urls`] - URL patterns, resolution and reversal

pub mod json;
pub mod request;
pub mod response;
pub mod urls;

use std::future::Future;
use std::pin::Pin;

use fbv_core::FbvResult;

pub use json::{JsonEncoder, Separators};
pub use request::{HttpRequest, MethodFlags};
pub use response::{
    FileResponse, HttpResponse, HttpResponsePermanentRedirect, HttpResponseRedirect,
    JsonResponse, ResponseContent,
};

/// The future returned by a routed handler.
pub type BoxFuture = Pin<Box<dyn Future<Output = FbvResult<HttpResponse>> + Send>>;
