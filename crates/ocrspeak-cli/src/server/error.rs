//! Server error types with context and recovery suggestions.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Error type for server operations with recovery suggestions.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Server configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Returns a unique error code for this error type.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "E001",
            Self::BindError { .. } => "E002",
            Self::Runtime(_) => "E003",
        }
    }

    /// Determines if this error is potentially recoverable.
    ///
    /// Recoverable errors might succeed with a different port or once a
    /// resource becomes available.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidConfig(_) => false,
            Self::BindError { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::PermissionDenied
                    | io::ErrorKind::AddrInUse
                    | io::ErrorKind::AddrNotAvailable
            ),
            Self::Runtime(err) => matches!(
                err.kind(),
                io::ErrorKind::PermissionDenied
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::ConnectionRefused
            ),
        }
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig(_) => {
                Some("Check the command-line flags and environment variables")
            }
            Self::BindError { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    Some("Try using a port above 1024 or run with appropriate privileges")
                }
                io::ErrorKind::AddrInUse => Some(
                    "The port is already in use. Try a different port or stop the conflicting service",
                ),
                io::ErrorKind::AddrNotAvailable => {
                    Some("The address is not available. Check network interface configuration")
                }
                _ => Some("Check network configuration and firewall settings"),
            },
            Self::Runtime(err) => match err.kind() {
                io::ErrorKind::PermissionDenied => Some("Check file and network permissions"),
                io::ErrorKind::Interrupted => Some("The operation was interrupted, you may retry"),
                io::ErrorKind::TimedOut => {
                    Some("The operation timed out, consider increasing timeout values")
                }
                _ => None,
            },
        }
    }

    /// Returns contextual information about this error as key-value pairs.
    pub fn context(&self) -> Vec<(&'static str, String)> {
        let mut context = vec![("error_code", self.error_code().to_owned())];

        if let Some(suggestion) = self.suggestion() {
            context.push(("suggestion", suggestion.to_owned()));
        }

        context.push(("recoverable", self.is_recoverable().to_string()));

        if let Self::BindError { address, .. } = self {
            context.push(("address", address.clone()));
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_in_use() {
        let error = ServerError::BindError {
            address: "127.0.0.1:7860".into(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };

        assert_eq!(error.error_code(), "E002");
        assert!(error.is_recoverable());
        assert!(error.suggestion().is_some_and(|s| s.contains("already in use")));
        assert!(
            error
                .context()
                .iter()
                .any(|(key, value)| *key == "address" && value == "127.0.0.1:7860")
        );
    }

    #[test]
    fn invalid_config_is_not_recoverable() {
        let error = ServerError::InvalidConfig("port".into());
        assert_eq!(error.error_code(), "E001");
        assert!(!error.is_recoverable());
    }
}
