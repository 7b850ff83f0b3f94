#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for OCR operations.
pub const TRACING_TARGET_OCR: &str = "ocrspeak_core::ocr";

/// Tracing target for speech synthesis operations.
pub const TRACING_TARGET_SPEECH: &str = "ocrspeak_core::speech";

mod error;
mod health;

pub mod language;
pub mod optical;
pub mod speech;
pub mod types;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use language::Language;
pub use optical::{OpticalProvider, OpticalService};
pub use speech::{AudioFormat, SpeechAudio, SpeechProvider, SpeechService};
pub use types::{OcrOutput, Quad, TextLine};
