//! HTTP response types.
//!
//! [`HttpResponse`] plus the constructors views reach for: JSON responses
//! encoded with explicit separators, 302/301 redirects and file responses that
//! stream from disk.

use std::io;
use std::path::Path;
use std::pin::Pin;

use axum::response::IntoResponse;
use bytes::Bytes;
use futures_core::Stream;
use http::{HeaderMap, HeaderValue, StatusCode};
use tokio_util::io::ReaderStream;

use fbv_core::{FbvError, FbvResult};

use crate::json::JsonEncoder;

/// The default `Content-Type` of an [`HttpResponse`].
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A boxed stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// The body content of an HTTP response.
pub enum ResponseContent {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
    /// A body produced chunk by chunk.
    Streaming(BodyStream),
}

impl std::fmt::Debug for ResponseContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Text(t) => f
                .debug_tuple("Text")
                .field(&t.chars().take(100).collect::<String>())
                .finish(),
            Self::Streaming(_) => f.debug_tuple("Streaming").finish(),
        }
    }
}

/// An HTTP response.
///
/// `content_type` holds the complete `Content-Type` header value, so a
/// caller-supplied type such as `application/json` is sent exactly as given.
///
/// # Examples
///
/// ```
/// use fbv_http::HttpResponse;
///
/// let response = HttpResponse::ok("Hello, World!");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.content_type(), "text/html; charset=utf-8");
/// ```
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: ResponseContent,
    content_type: String,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    /// Creates a response with the given status code and text body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Text(body.into()),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Creates a response with the given status code and byte body.
    pub fn with_bytes(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: ResponseContent::Bytes(body),
            content_type: "application/octet-stream".to_string(),
        }
    }

    /// Creates a 200 response whose body is read from `stream`.
    pub fn streaming(stream: BodyStream, content_type: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            content: ResponseContent::Streaming(stream),
            content_type: content_type.into(),
        }
    }

    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// Creates a 405 Method Not Allowed response with an `Allow` header.
    pub fn not_allowed(permitted_methods: &[&str]) -> Self {
        let allowed = permitted_methods.join(", ");
        let mut response = Self::new(StatusCode::METHOD_NOT_ALLOWED, "");
        if let Ok(value) = HeaderValue::from_str(&allowed) {
            response.headers.insert(http::header::ALLOW, value);
        }
        response
    }

    /// Creates the response for an error that escaped a view.
    ///
    /// In debug mode the body carries the error message; otherwise only the
    /// canonical reason phrase.
    pub fn from_error(error: &FbvError, debug: bool) -> Self {
        let status = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = if debug {
            error.to_string()
        } else {
            status.canonical_reason().unwrap_or("Error").to_string()
        };
        let mut response = Self::new(status, body);
        response.set_content_type("text/plain; charset=utf-8");
        response
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns a reference to the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Adds a header to the response.
    #[must_use]
    pub fn set_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns a header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the complete `Content-Type` value.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Replaces the `Content-Type` value.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the response body.
    pub const fn content(&self) -> &ResponseContent {
        &self.content
    }

    /// Returns `true` if the body is streamed.
    pub const fn is_streaming(&self) -> bool {
        matches!(self.content, ResponseContent::Streaming(_))
    }

    /// Returns the body as bytes, if it is not streamed.
    pub fn content_bytes(&self) -> Option<Vec<u8>> {
        match &self.content {
            ResponseContent::Bytes(b) => Some(b.clone()),
            ResponseContent::Text(t) => Some(t.as_bytes().to_vec()),
            ResponseContent::Streaming(_) => None,
        }
    }

    /// Consumes the response and returns the whole body, draining the stream
    /// if there is one.
    pub async fn collect_bytes(self) -> FbvResult<Vec<u8>> {
        match self.content {
            ResponseContent::Bytes(b) => Ok(b),
            ResponseContent::Text(t) => Ok(t.into_bytes()),
            ResponseContent::Streaming(mut stream) => {
                let mut body = Vec::new();
                while let Some(chunk) =
                    std::future::poll_fn(|cx| stream.as_mut().poll_next(cx)).await
                {
                    body.extend_from_slice(&chunk?);
                }
                Ok(body)
            }
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let body = match self.content {
            ResponseContent::Text(text) => axum::body::Body::from(text),
            ResponseContent::Bytes(bytes) => axum::body::Body::from(bytes),
            ResponseContent::Streaming(stream) => axum::body::Body::from_stream(stream),
        };

        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        if let Ok(ct) = HeaderValue::from_str(&self.content_type) {
            response.headers_mut().insert(http::header::CONTENT_TYPE, ct);
        }
        for (key, value) in &self.headers {
            response.headers_mut().insert(key, value.clone());
        }
        response
    }
}

/// A JSON response with `Content-Type: application/json`.
pub struct JsonResponse;

impl JsonResponse {
    /// Encodes `data` with the default (minified) separators.
    pub fn new<T: serde::Serialize + ?Sized>(data: &T) -> FbvResult<HttpResponse> {
        Self::with_encoder(data, &JsonEncoder::default())
    }

    /// Encodes `data` with the given encoder.
    pub fn with_encoder<T: serde::Serialize + ?Sized>(
        data: &T,
        encoder: &JsonEncoder,
    ) -> FbvResult<HttpResponse> {
        let json = encoder.encode(data)?;
        let mut response = HttpResponse::new(StatusCode::OK, json);
        response.set_content_type("application/json");
        Ok(response)
    }
}

/// An HTTP redirect response (302 Found).
pub struct HttpResponseRedirect;

impl HttpResponseRedirect {
    /// Creates a 302 Found redirect to the given URL.
    pub fn new(url: &str) -> HttpResponse {
        redirect(StatusCode::FOUND, url)
    }
}

/// An HTTP permanent redirect response (301 Moved Permanently).
pub struct HttpResponsePermanentRedirect;

impl HttpResponsePermanentRedirect {
    /// Creates a 301 Moved Permanently redirect to the given URL.
    pub fn new(url: &str) -> HttpResponse {
        redirect(StatusCode::MOVED_PERMANENTLY, url)
    }
}

fn redirect(status: StatusCode, url: &str) -> HttpResponse {
    let mut response = HttpResponse::new(status, "");
    if let Ok(value) = HeaderValue::from_str(url) {
        response.headers.insert(http::header::LOCATION, value);
    }
    response
}

/// A response that streams a file from disk.
pub struct FileResponse;

impl FileResponse {
    /// Opens `path` and returns a streamed 200 response.
    ///
    /// The content type is inferred from the extension. `Content-Length` and
    /// an inline `Content-Disposition` with the file name are set.
    ///
    /// # Errors
    ///
    /// [`FbvError::NotFound`] if the file does not exist; other I/O failures
    /// as [`FbvError::IoError`].
    pub async fn open(path: &Path) -> FbvResult<HttpResponse> {
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                FbvError::NotFound(format!("File not found: {}", path.display()))
            } else {
                FbvError::IoError(e)
            }
        })?;
        let metadata = file.metadata().await?;
        if metadata.is_dir() {
            return Err(FbvError::NotFound(format!(
                "File not found: {} is a directory",
                path.display()
            )));
        }

        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or("application/octet-stream", mime_from_extension);

        let mut response = HttpResponse::streaming(Box::pin(ReaderStream::new(file)), content_type);
        response.headers.insert(
            http::header::CONTENT_LENGTH,
            HeaderValue::from(metadata.len()),
        );
        if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
            if let Ok(value) = HeaderValue::from_str(&format!("inline; filename=\"{filename}\"")) {
                response
                    .headers
                    .insert(http::header::CONTENT_DISPOSITION, value);
            }
        }

        tracing::debug!(path = %path.display(), content_type, "streaming file");
        Ok(response)
    }
}

/// Infers a MIME type from a file extension.
pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "pdf" => "application/pdf",
        "webmanifest" => "application/manifest+json",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_ok() {
        let resp = HttpResponse::ok("Hello");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.content_type(), DEFAULT_CONTENT_TYPE);
        assert_eq!(resp.content_bytes().unwrap(), b"Hello");
        assert!(!resp.is_streaming());
    }

    #[test]
    fn test_custom_content_type_is_exact() {
        let mut resp = HttpResponse::ok("{}");
        resp.set_content_type("application/json");
        let axum_resp = resp.into_response();
        assert_eq!(
            axum_resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_not_allowed() {
        let resp = HttpResponse::not_allowed(&["GET", "HEAD"]);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.header("allow"), Some("GET, HEAD"));
    }

    #[test]
    fn test_from_error() {
        let err = FbvError::NotFound("File not found: x".into());
        let resp = HttpResponse::from_error(&err, true);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.content_bytes().unwrap(), b"Not found: File not found: x");

        let err = FbvError::TemplateDoesNotExist("a.html".into());
        let resp = HttpResponse::from_error(&err, false);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.content_bytes().unwrap(), b"Internal Server Error");
    }

    #[test]
    fn test_redirects() {
        let resp = HttpResponseRedirect::new("/test-decorator");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.header("location"), Some("/test-decorator"));

        let resp = HttpResponsePermanentRedirect::new("/test-decorator");
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.header("location"), Some("/test-decorator"));
    }

    #[test]
    fn test_json_response() {
        let resp = JsonResponse::new(&serde_json::json!({"test": 123})).unwrap();
        assert_eq!(resp.content_type(), "application/json");
        assert_eq!(resp.content_bytes().unwrap(), br#"{"test":123}"#);
    }

    #[test]
    fn test_headers_copied_into_axum_response() {
        let resp = HttpResponse::ok("x").set_header(
            http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        );
        let axum_resp = resp.into_response();
        assert_eq!(
            axum_resp.headers().get(http::header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("txt"), "text/plain");
        assert_eq!(mime_from_extension("PNG"), "image/png");
        assert_eq!(mime_from_extension("svg"), "image/svg+xml");
        assert_eq!(mime_from_extension("bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_file_response_streams_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("robots.txt");
        std::fs::write(&path, "User-agent: *\nDisallow:\n").unwrap();

        let resp = FileResponse::open(&path).await.unwrap();
        assert!(resp.is_streaming());
        assert_eq!(resp.content_type(), "text/plain");
        assert_eq!(resp.header("content-length"), Some("24"));
        assert_eq!(
            resp.header("content-disposition"),
            Some("inline; filename=\"robots.txt\"")
        );
        let body = resp.collect_bytes().await.unwrap();
        assert_eq!(body, b"User-agent: *\nDisallow:\n");
    }

    #[tokio::test]
    async fn test_file_response_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileResponse::open(&dir.path().join("bad-file-path"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_file_response_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileResponse::open(dir.path()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
