//! Multipart extractor with error responses in the handler format.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart as AxumMultipart, Request};
use axum::http::StatusCode;
use derive_more::{Deref, DerefMut, From};

use crate::handler::{Error, ErrorKind};

/// Multipart extractor rejecting with [`Error`].
///
/// Wraps [`axum::extract::Multipart`] so malformed uploads get the same
/// JSON error body as every other failure.
#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub AxumMultipart);

impl Multipart {
    /// Returns the inner Axum Multipart extractor.
    #[inline]
    pub fn into_inner(self) -> AxumMultipart {
        self.0
    }
}

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumMultipart::from_request(req, state)
            .await
            .map(Multipart)
            .map_err(Into::into)
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            MultipartRejection::InvalidBoundary(_) => ErrorKind::BadRequest
                .with_message("Invalid multipart boundary")
                .with_context(
                    "The Content-Type header is missing or has an invalid boundary parameter. \
                     Ensure the request uses 'multipart/form-data' with a valid boundary.",
                ),
            _ => ErrorKind::BadRequest
                .with_message("Invalid multipart request")
                .with_context(format!("Multipart parsing failed: {rejection}")),
        }
    }
}

impl From<MultipartError> for Error {
    fn from(error: MultipartError) -> Self {
        let kind = match error.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ErrorKind::PayloadTooLarge,
            _ => ErrorKind::BadRequest,
        };

        kind.with_context(format!("Multipart field could not be read: {}", error.body_text()))
    }
}
