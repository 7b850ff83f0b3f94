//! HTTP request extractors with error responses in the handler format.
//!
//! - [`Multipart`] - multipart form extraction that rejects with
//!   [`Error`](crate::handler::Error) instead of plain text.

mod multipart;

pub use crate::extract::multipart::Multipart;
