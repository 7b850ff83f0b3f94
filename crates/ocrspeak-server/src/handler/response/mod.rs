//! Response types for HTTP handlers.

mod errors;
mod languages;
mod monitors;
mod ocr;

pub use errors::*;
pub use languages::*;
pub use monitors::*;
pub use ocr::*;
