//! Mock implementations of the OCR and speech capabilities.

mod optical;
mod speech;

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use ocrspeak_core::{OpticalService, SpeechService};
pub use optical::MockOpticalProvider;
pub use speech::MockSpeechProvider;

/// Creates mock OCR and speech services with default behaviour.
///
/// The OCR service finds no text and the speech service returns a short
/// fake MP3 payload.
pub fn create_mock_services() -> (OpticalService, SpeechService) {
    (
        OpticalService::new(MockOpticalProvider::default()),
        SpeechService::new(MockSpeechProvider::default()),
    )
}

/// Encodes a small solid-color PNG for upload tests.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([240, 240, 240]));
    let mut buffer = Cursor::new(Vec::new());
    match image.write_to(&mut buffer, ImageFormat::Png) {
        Ok(()) => buffer.into_inner(),
        Err(_) => Vec::new(),
    }
}
