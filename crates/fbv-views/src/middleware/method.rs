//! Request method flags.
//!
//! [`RequestMethodMiddleware`] attaches one boolean per HTTP method to every
//! request, so views can write `request.is_post()` instead of comparing the
//! method string.

use async_trait::async_trait;

use fbv_core::FbvError;
use fbv_http::{HttpRequest, HttpResponse};

use super::Middleware;

/// Sets [`MethodFlags`](fbv_http::MethodFlags) on each request.
///
/// Exactly one of GET, POST, PUT, PATCH, DELETE, HEAD, CONNECT and TRACE is
/// true when the method is one of them; the match is case-sensitive. Flags
/// already present on the request are replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMethodMiddleware;

#[async_trait]
impl Middleware for RequestMethodMiddleware {
    async fn process_request(&self, request: &mut HttpRequest) -> Option<HttpResponse> {
        request.set_method_flags();
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
        _error: &FbvError,
    ) -> Option<HttpResponse> {
        None
    }
}
