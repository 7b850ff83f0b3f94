//! The rejection type shared by extractors, middleware and routes.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// The error type for HTTP handlers in the server.
///
/// Only requests that cannot be read at all end up here. Failures while
/// processing an image are reported inside a successful response instead.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
    context: Option<String>,
}

impl Error {
    /// Creates an error that responds with the kind's default body.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
        }
    }

    /// Replaces the message shown to the user.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Attaches context that is logged but not returned.
    #[inline]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    fn into_body(self) -> ErrorResponse {
        let mut body = self.kind.response();
        if let Some(message) = self.message {
            body = body.with_message(message);
        }
        if let Some(context) = self.context {
            body = body.with_context(context);
        }
        body
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.kind.response();
        let message = self.message.as_deref().unwrap_or(body.message.as_ref());
        write!(f, "{} ({}): {}", body.name, body.status, message)?;

        if let Some(context) = &self.context {
            write!(f, " - {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_body().into_response()
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All HTTP error kinds the server responds with.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400, the body is not a readable multipart form.
    BadRequest,
    /// 404, unknown route or audio file.
    NotFound,
    /// 413, the upload exceeds the body limit.
    PayloadTooLarge,
    /// 500, a panic or middleware failure.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_message(message)
    }

    /// Creates an [`Error`] with the specified context.
    #[inline]
    pub fn with_context(self, context: impl Into<String>) -> Error {
        Error::new(self).with_context(context)
    }

    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the default body for this kind.
    pub fn response(self) -> ErrorResponse {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().name)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_message_replaces_default() {
        let error = ErrorKind::BadRequest
            .with_message("Invalid multipart boundary")
            .with_context("missing boundary parameter");

        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Invalid multipart boundary"));
        assert_eq!(error.context(), Some("missing boundary parameter"));

        let body = error.into_body();
        assert_eq!(body.message, "Invalid multipart boundary");
        assert_eq!(body.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn display_includes_status_and_context() {
        let error = ErrorKind::PayloadTooLarge.with_context("limit is 20 MiB");
        let display = error.to_string();

        assert!(display.starts_with("payload_too_large (413"));
        assert!(display.contains("The uploaded file is too large"));
        assert!(display.ends_with(" - limit is 20 MiB"));
    }

    #[test]
    fn kinds_map_to_status_codes() {
        let expected = [
            (ErrorKind::BadRequest, StatusCode::BAD_REQUEST),
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (ErrorKind::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (kind, status) in expected {
            assert_eq!(kind.status_code(), status);
            assert_eq!(kind.into_response().status(), status);
        }
        assert_eq!(ErrorKind::default(), ErrorKind::InternalServerError);
    }
}
