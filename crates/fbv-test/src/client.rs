//! In-process HTTP test client.
//!
//! [`TestClient`] sends requests through an axum router with
//! `tower::ServiceExt::oneshot`, so no socket is opened. It mirrors Django's
//! `django.test.Client`.
//!
//! ```rust,no_run
//! use fbv_core::Settings;
//! use fbv_test::TestClient;
//! use fbv_views::server::App;
//!
//! # async fn example() {
//! let mut client = TestClient::from_app(App::new(Settings::default()));
//! let response = client.get("/test-view").await;
//! assert_eq!(response.status_code(), 404);
//! # }
//! ```

use axum::body::Body;
use axum::Router;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use fbv_core::FbvError;
use fbv_views::server::App;

/// Sends requests to a router in process.
pub struct TestClient {
    app: Router,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps an axum router.
    pub const fn new(app: Router) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Wraps an [`App`].
    pub fn from_app(app: App) -> Self {
        Self::new(app.into_axum_router())
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Sends a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.request(Method::GET, path, Vec::new(), None).await
    }

    /// Sends a HEAD request.
    pub async fn head(&mut self, path: &str) -> TestResponse {
        self.request(Method::HEAD, path, Vec::new(), None).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, Vec::new(), None).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post_json(&mut self, path: &str, json: &serde_json::Value) -> TestResponse {
        let body = serde_json::to_vec(json).unwrap_or_default();
        self.request(Method::POST, path, body, Some("application/json"))
            .await
    }

    /// Sends a request with any method and body.
    ///
    /// # Panics
    ///
    /// If `path` is not a valid URI.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in &self.default_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ct) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, ct);
        }
        let req = builder
            .body(Body::from(body))
            .expect("request builder should not fail");

        self.send(req).await
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(req)
            .await
            .expect("router should not error");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map_or_else(|_| Bytes::new(), http_body_util::Collected::to_bytes);

        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    /// The status code.
    pub status: StatusCode,
    /// The headers.
    pub headers: HeaderMap,
    /// The full body.
    pub body: Vec<u8>,
}

impl TestResponse {
    /// The body as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, FbvError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| FbvError::SerializationError(e.to_string()))
    }

    /// The numeric status code.
    pub const fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// A header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The `Location` header of a redirect.
    pub fn url(&self) -> Option<&str> {
        self.header("location")
    }

    /// Returns `true` if the body contains `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.text().contains(text)
    }
}
