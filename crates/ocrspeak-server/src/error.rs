//! Service layer error types.
//!
//! Errors here never reach the client as-is: the request pipeline turns
//! them into messages shown next to the uploaded image.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing service layer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Configuration-related errors.
    Config,
    /// Failures reported by the OCR or speech capability.
    External,
    /// File system operation errors.
    FileSystem,
    /// The uploaded data could not be used.
    Input,
    /// Internal service logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::FileSystem => "file_system",
            Self::Input => "invalid_input",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without the kind prefix.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new external service error.
    #[inline]
    pub fn external(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::External, full_message)
    }

    /// Creates a new file system error.
    #[inline]
    pub fn file_system(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::FileSystem, message)
    }

    /// Creates a new invalid input error.
    #[inline]
    pub fn input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    /// Creates a new internal service error.
    #[inline]
    pub fn internal(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::Internal, full_message)
    }
}

impl From<ocrspeak_core::Error> for Error {
    fn from(err: ocrspeak_core::Error) -> Self {
        let message = err.message().to_owned();
        match err.kind() {
            ocrspeak_core::ErrorKind::InvalidInput => Error::input(message).with_source(err),
            _ => Error::new(ErrorKind::External, message).with_source(err),
        }
    }
}

impl From<ocrspeak_paddle::Error> for Error {
    fn from(err: ocrspeak_paddle::Error) -> Self {
        Error::internal(err.category(), err.to_string()).with_source(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(_) | image::ImageError::Decoding(_) => {
                Error::input(err.to_string()).with_source(err)
            }
            _ => Error::internal("image", err.to_string()).with_source(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::config("invalid configuration");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "invalid configuration");
        assert_eq!(error.to_string(), "config error: invalid configuration");
    }

    #[test]
    fn error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::file_system("cannot create audio directory").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert_eq!(error.kind(), ErrorKind::FileSystem);
    }

    #[test]
    fn external_service_error() {
        let error = Error::external("inference", "session run failed");

        assert_eq!(error.kind(), ErrorKind::External);
        assert_eq!(error.message(), "inference: session run failed");
    }

    #[test]
    fn core_errors_keep_their_message() {
        let core = ocrspeak_core::Error::invalid_input().with_message("No text to speak");
        let error = Error::from(core);
        assert_eq!(error.kind(), ErrorKind::Input);
        assert_eq!(error.message(), "No text to speak");
    }

    #[test]
    fn error_kind_as_str() {
        assert_eq!(ErrorKind::Config.as_str(), "config");
        assert_eq!(ErrorKind::External.as_str(), "external_service");
        assert_eq!(ErrorKind::FileSystem.as_str(), "file_system");
        assert_eq!(ErrorKind::Input.as_str(), "invalid_input");
        assert_eq!(ErrorKind::Internal.as_str(), "internal_service");
    }
}
