#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

use std::time::Duration;

/// Logging target for speech client operations.
pub const TRACING_TARGET_CLIENT: &str = "ocrspeak_speech::client";

/// Logging target for HTTP requests and responses.
pub const TRACING_TARGET_HTTP: &str = "ocrspeak_speech::http";

mod client;
mod provider;
pub mod text;

pub use client::{SpeechClient, SpeechConfig};
pub use provider::GoogleTtsProvider;

/// Result type for all speech operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error types for speech synthesis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client errors (connection, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("{status} from TTS API. Probable cause: {cause}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Likely explanation for the status
        cause: String,
    },

    /// The response did not contain an audio payload
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what's invalid
        message: String,
    },

    /// The audio payload was not valid base64
    #[error("Audio decoding error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Request payload could not be built
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Duration before timeout occurred
        timeout: Duration,
    },

    /// Nothing to speak
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what's invalid
        message: String,
    },
}

impl Error {
    /// Create an API error from a status code
    pub fn api(status: u16, cause: impl Into<String>) -> Self {
        Self::Api {
            status,
            cause: cause.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Check if this error indicates a temporary failure that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(err) => err.is_timeout() || err.is_connect(),
            Error::Api { status, .. } => matches!(*status, 429 | 500..=599),
            Error::InvalidResponse { .. }
            | Error::Decode(_)
            | Error::Serialization(_)
            | Error::Config { .. }
            | Error::InvalidInput { .. } => false,
        }
    }

    /// Get the HTTP status code if this is an HTTP/API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Api { .. } => "api",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::Decode(_) => "decode",
            Error::Serialization(_) => "serialization",
            Error::Config { .. } => "config",
            Error::Timeout { .. } => "timeout",
            Error::InvalidInput { .. } => "invalid_input",
        }
    }

    /// Get a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Error::Http(_) => "Network error occurred. Please check your connection.".to_string(),
            Error::Timeout { timeout } => {
                format!("Request timed out after {timeout:?}. Please try again.")
            }
            Error::InvalidInput { message } => format!("Invalid input: {message}"),
            Error::Config { message } => format!("Configuration error: {message}"),
            _ => self.to_string(),
        }
    }
}

impl From<Error> for ocrspeak_core::Error {
    fn from(err: Error) -> Self {
        let base = match &err {
            Error::InvalidInput { .. } => ocrspeak_core::Error::invalid_input(),
            Error::Config { .. } => ocrspeak_core::Error::configuration(),
            Error::Timeout { .. } => ocrspeak_core::Error::timeout(),
            Error::Serialization(_) => ocrspeak_core::Error::serialization(),
            Error::Http(_) | Error::Api { .. } | Error::InvalidResponse { .. } | Error::Decode(_) => {
                ocrspeak_core::Error::external_error()
            }
        };

        base.with_message(err.to_string()).with_source(err)
    }
}
