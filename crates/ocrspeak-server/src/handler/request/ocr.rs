//! OCR upload form.

use bytes::Bytes;

use crate::extract::Multipart;
use crate::handler::{Error, Result};

/// Tracing target for form parsing.
const TRACING_TARGET: &str = "ocrspeak_server::handler::request::ocr";

/// Fields posted by the upload page.
///
/// Every field is optional. A missing image is answered with a message,
/// not a rejection.
#[derive(Debug, Clone, Default)]
pub struct OcrForm {
    /// Raw bytes of the uploaded file, `image`.
    pub image: Option<Bytes>,
    /// Dropdown selection, `language`.
    pub language: Option<String>,
    /// Whether the text should be read aloud, `speak`.
    pub speak: bool,
}

impl OcrForm {
    /// Reads all fields from a multipart body.
    ///
    /// Unknown fields are skipped. An empty file part counts as no image.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|err| {
            tracing::warn!(target: TRACING_TARGET, error = %err, "Failed to read multipart field");
            Error::from(err)
        })? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().map(str::to_owned);
                    let data = field.bytes().await?;
                    tracing::debug!(
                        target: TRACING_TARGET,
                        file_name = file_name.as_deref(),
                        size = data.len(),
                        "Received image upload"
                    );
                    form.image = Some(data).filter(|data| !data.is_empty());
                }
                "language" => {
                    let value = field.text().await?;
                    let value = value.trim();
                    form.language = (!value.is_empty()).then(|| value.to_owned());
                }
                "speak" => {
                    let value = field.text().await?;
                    form.speak = parse_flag(&value);
                }
                other => {
                    tracing::debug!(target: TRACING_TARGET, field = other, "Skipping unknown field");
                }
            }
        }

        Ok(form)
    }
}

/// Checkbox values browsers and scripts commonly send.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}
