//! Core error type for fbv-rs.
//!
//! [`FbvError`] covers routing, template, serialization, configuration and IO
//! failures. Each variant maps to the HTTP status the server glue answers with
//! when an error escapes a view.

use thiserror::Error;

/// The primary error type for fbv-rs.
///
/// Errors raised inside views propagate unchanged through the decorators; the
/// application turns whatever reaches it into a response using
/// [`FbvError::status_code`].
#[derive(Error, Debug)]
pub enum FbvError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found. Also raised for missing files in file-serving views.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Routing ──────────────────────────────────────────────────────

    /// No URL pattern with the given name (and arguments) could be reversed.
    #[error("Reverse for '{0}' not found")]
    NoReverseMatch(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A view or decorator was used against its contract, e.g. restricting
    /// `fields` on a JSON view that does not return a model.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Templates ────────────────────────────────────────────────────

    /// A template contains invalid syntax or failed while rendering.
    #[error("Template syntax error: {0}")]
    TemplateSyntaxError(String),

    /// The requested template was not found by any loader.
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred while encoding a response body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FbvError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest` -> 400
    /// - `NotFound` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::InternalServerError(_)
            | Self::NoReverseMatch(_)
            | Self::ConfigurationError(_)
            | Self::ImproperlyConfigured(_)
            | Self::TemplateSyntaxError(_)
            | Self::TemplateDoesNotExist(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` for errors that mean the requested resource is absent.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A convenience type alias for `Result<T, FbvError>`.
pub type FbvResult<T> = Result<T, FbvError>;
