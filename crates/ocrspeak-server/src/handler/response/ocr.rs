//! OCR response types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::service::OcrOutcome;

/// Result of one upload as shown by the page.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    /// PNG image as a `data:` URI.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    /// Whether the image carries the drawn regions and text panel.
    pub annotated: bool,
    /// Extracted text or a message for the user.
    pub text: String,
    /// Where the spoken text can be played from.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audio_url: Option<String>,
    /// Why speech is missing although it was requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub speech_error: Option<String>,
}

impl From<OcrOutcome> for OcrResponse {
    fn from(outcome: OcrOutcome) -> Self {
        Self {
            image: outcome
                .image
                .map(|png| format!("data:image/png;base64,{}", STANDARD.encode(png))),
            annotated: outcome.annotated,
            text: outcome.text,
            audio_url: outcome.audio.map(|audio| audio.url),
            speech_error: outcome.speech_error,
        }
    }
}
