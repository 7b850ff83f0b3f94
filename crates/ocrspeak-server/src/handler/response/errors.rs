use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Tracing target for rejected requests.
const TRACING_TARGET: &str = "ocrspeak_server::handler::rejected";

/// JSON body for requests that could not be read.
///
/// The page shows `message` in the text box. Context is logged but never
/// sent to the client.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable identifier, e.g. `bad_request`.
    pub name: Cow<'static, str>,
    /// Message safe to show to the user.
    pub message: Cow<'static, str>,

    #[serde(skip)]
    pub context: Option<String>,
    #[serde(skip, default = "default_status")]
    pub status: StatusCode,
}

fn default_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl ErrorResponse {
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "The upload could not be read. Please try again with an image file",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self = Self::new(
        "not_found",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const PAYLOAD_TOO_LARGE: Self = Self::new(
        "payload_too_large",
        "The uploaded file is too large",
        StatusCode::PAYLOAD_TOO_LARGE,
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'static str, message: &'static str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            context: None,
            status,
        }
    }

    /// Replaces the user-facing message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches context, joining it to any context already present.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(existing) => format!("{existing}; {context}"),
            None => context,
        });
        self
    }
}

impl Default for ErrorResponse {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        tracing::warn!(
            target: TRACING_TARGET,
            status = %self.status,
            name = %self.name,
            message = %self.message,
            context = ?self.context,
            "Request rejected"
        );
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_replaced() {
        let response = ErrorResponse::BAD_REQUEST.with_message("Invalid multipart boundary");
        assert_eq!(response.message, "Invalid multipart boundary");
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn context_is_joined() {
        let response = ErrorResponse::NOT_FOUND
            .with_context("audio")
            .with_context("missing.mp3");

        assert_eq!(response.context.as_deref(), Some("audio; missing.mp3"));
    }

    #[test]
    fn serialization_hides_context_and_status() -> anyhow::Result<()> {
        let response = ErrorResponse::PAYLOAD_TOO_LARGE.with_context("limit is 20 MiB");
        let json = serde_json::to_value(&response)?;

        assert_eq!(json["name"], "payload_too_large");
        assert_eq!(json["message"], "The uploaded file is too large");
        assert!(json.get("context").is_none());
        assert!(json.get("status").is_none());
        Ok(())
    }
}
