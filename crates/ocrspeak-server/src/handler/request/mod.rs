//! Request types for HTTP handlers.

mod ocr;

pub use ocr::*;
