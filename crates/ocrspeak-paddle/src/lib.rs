#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

use std::path::PathBuf;

/// Logging target for model layout checks.
pub const TRACING_TARGET_LAYOUT: &str = "ocrspeak_paddle::layout";

/// Logging target for inference operations.
pub const TRACING_TARGET_ENGINE: &str = "ocrspeak_paddle::engine";

/// Logging target for result drawing.
pub const TRACING_TARGET_DRAW: &str = "ocrspeak_paddle::draw";

mod config;
mod draw;
mod engine;
mod layout;
mod provider;

pub use config::PaddleConfig;
pub use draw::{DrawOptions, FontResource, draw_ocr};
pub use engine::PaddleEngine;
pub use layout::{LayoutReport, ModelLayout, ModelPart, PartStatus};
pub use provider::PaddleProvider;

/// Result type for all operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error types for the local OCR pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A model folder, model file or dictionary is missing on disk
    #[error("{part} not found: '{}'", path.display())]
    MissingResource {
        /// Which part of the layout is missing
        part: ModelPart,
        /// Path that was checked
        path: PathBuf,
    },

    /// An ONNX session could not be created
    #[error("Failed to load {part} model: {message}")]
    ModelLoad {
        /// Which model failed to load
        part: ModelPart,
        /// Loader error message
        message: String,
    },

    /// The recognition dictionary is unreadable or empty
    #[error("Invalid character dictionary: {message}")]
    Dictionary {
        /// Description of the problem
        message: String,
    },

    /// Running a model failed
    #[error("{stage} inference failed: {message}")]
    Inference {
        /// Pipeline stage (detection, classification, recognition)
        stage: &'static str,
        /// Runtime error message
        message: String,
    },

    /// Image decoding or encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The font file could not be read or parsed
    #[error("Font error: {message}")]
    Font {
        /// Description of the font problem
        message: String,
    },

    /// Invalid input data
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what's invalid
        message: String,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing resource error
    pub fn missing(part: ModelPart, path: impl Into<PathBuf>) -> Self {
        Self::MissingResource {
            part,
            path: path.into(),
        }
    }

    /// Create a model load error
    pub fn model_load(part: ModelPart, message: impl ToString) -> Self {
        Self::ModelLoad {
            part,
            message: message.to_string(),
        }
    }

    /// Create a dictionary error
    pub fn dictionary(message: impl Into<String>) -> Self {
        Self::Dictionary {
            message: message.into(),
        }
    }

    /// Create an inference error
    pub fn inference(stage: &'static str, message: impl ToString) -> Self {
        Self::Inference {
            stage,
            message: message.to_string(),
        }
    }

    /// Create a font error
    pub fn font(message: impl Into<String>) -> Self {
        Self::Font {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Get the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::MissingResource { .. } => "missing_resource",
            Error::ModelLoad { .. } => "model_load",
            Error::Dictionary { .. } => "dictionary",
            Error::Inference { .. } => "inference",
            Error::Image(_) => "image",
            Error::Font { .. } => "font",
            Error::InvalidInput { .. } => "invalid_input",
            Error::Io(_) => "io",
        }
    }

    /// Check if this error indicates a temporary failure that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Get a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingResource { part, .. } => {
                format!("{part} is missing. Please check the model installation.")
            }
            Error::ModelLoad { part, .. } => format!("Failed to load the {part}."),
            Error::Image(_) => "The uploaded file could not be read as an image.".to_string(),
            Error::Font { .. } => "The font file could not be loaded.".to_string(),
            Error::InvalidInput { message } => format!("Invalid input: {message}"),
            _ => self.to_string(),
        }
    }

    /// Check if this error is caused by the local installation rather than the request
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Error::MissingResource { .. }
                | Error::ModelLoad { .. }
                | Error::Dictionary { .. }
                | Error::Font { .. }
        )
    }
}

impl From<Error> for ocrspeak_core::Error {
    fn from(err: Error) -> Self {
        let base = match &err {
            Error::MissingResource { .. } => ocrspeak_core::Error::not_found(),
            Error::ModelLoad { .. } | Error::Dictionary { .. } | Error::Font { .. } => {
                ocrspeak_core::Error::configuration()
            }
            Error::Inference { .. } => ocrspeak_core::Error::inference(),
            Error::Image(_) | Error::InvalidInput { .. } => ocrspeak_core::Error::invalid_input(),
            Error::Io(_) => ocrspeak_core::Error::internal_error(),
        };

        base.with_message(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        let missing = Error::missing(ModelPart::Detection, "models/det");
        assert_eq!(missing.category(), "missing_resource");
        assert!(missing.is_setup_error());

        let inference = Error::inference("detection", "bad shape");
        assert_eq!(inference.category(), "inference");
        assert!(!inference.is_setup_error());
        assert!(!inference.is_retryable());
        assert_eq!(
            inference.user_message(),
            "detection inference failed: bad shape"
        );
    }

    #[test]
    fn converts_into_core_error() {
        let core: ocrspeak_core::Error = Error::inference("recognition", "boom").into();
        assert_eq!(core.kind(), ocrspeak_core::ErrorKind::Inference);
        assert!(core.to_string().contains("recognition inference failed: boom"));
    }
}
