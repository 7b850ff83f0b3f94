//! Text line and OCR output types.

use derive_more::Deref;
use serde::{Deserialize, Serialize};

/// Quadrilateral text region in image pixel coordinates.
///
/// Points are ordered clockwise starting at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quad {
    /// Corner points as `[x, y]` pairs.
    pub points: [[f32; 2]; 4],
}

impl Quad {
    /// Creates a quad from four corner points.
    pub const fn new(points: [[f32; 2]; 4]) -> Self {
        Self { points }
    }

    /// Creates an axis-aligned quad from its bounds.
    pub const fn from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            points: [[min_x, min_y], [max_x, min_y], [max_x, max_y], [min_x, max_y]],
        }
    }

    /// Returns `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let xs = self.points.iter().map(|p| p[0]);
        let ys = self.points.iter().map(|p| p[1]);
        (
            xs.clone().fold(f32::INFINITY, f32::min),
            ys.clone().fold(f32::INFINITY, f32::min),
            xs.fold(f32::NEG_INFINITY, f32::max),
            ys.fold(f32::NEG_INFINITY, f32::max),
        )
    }

    /// Returns the top-left corner.
    #[inline]
    pub fn top_left(&self) -> [f32; 2] {
        self.points[0]
    }
}

/// A single recognized line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Region the text was read from.
    pub region: Quad,
    /// Recognized text.
    pub text: String,
    /// Recognition confidence in `[0, 1]`.
    pub score: f32,
}

impl TextLine {
    /// Creates a new text line.
    pub fn new(region: Quad, text: impl Into<String>, score: f32) -> Self {
        Self {
            region,
            text: text.into(),
            score,
        }
    }
}

/// Everything an OCR pipeline found in one image, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Deref, Serialize, Deserialize)]
pub struct OcrOutput {
    #[deref]
    lines: Vec<TextLine>,
}

impl OcrOutput {
    /// Creates an output from recognized lines.
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    /// Returns the recognized lines.
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Returns the recognized texts in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }

    /// Returns all texts joined with newlines.
    pub fn joined_text(&self) -> String {
        self.texts().collect::<Vec<_>>().join("\n")
    }

    /// Splits the output into parallel boxes, texts and scores.
    pub fn into_parts(self) -> (Vec<Quad>, Vec<String>, Vec<f32>) {
        let mut boxes = Vec::with_capacity(self.lines.len());
        let mut texts = Vec::with_capacity(self.lines.len());
        let mut scores = Vec::with_capacity(self.lines.len());

        for line in self.lines {
            boxes.push(line.region);
            texts.push(line.text);
            scores.push(line.score);
        }

        (boxes, texts, scores)
    }
}

impl From<Vec<TextLine>> for OcrOutput {
    fn from(lines: Vec<TextLine>) -> Self {
        Self::new(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OcrOutput {
        OcrOutput::new(vec![
            TextLine::new(Quad::from_bounds(0.0, 0.0, 50.0, 10.0), "Hello", 0.98),
            TextLine::new(Quad::from_bounds(0.0, 20.0, 60.0, 30.0), "World", 0.91),
        ])
    }

    #[test]
    fn into_parts_keeps_order() {
        let (boxes, texts, scores) = sample().into_parts();
        assert_eq!(texts, vec!["Hello".to_string(), "World".to_string()]);
        assert_eq!(scores, vec![0.98, 0.91]);
        assert_eq!(boxes[1].top_left(), [0.0, 20.0]);
    }

    #[test]
    fn joined_text_uses_newlines() {
        assert_eq!(sample().joined_text(), "Hello\nWorld");
        assert!(OcrOutput::default().is_empty());
    }

    #[test]
    fn quad_bounds() {
        let quad = Quad::new([[3.0, 1.0], [9.0, 2.0], [8.0, 7.0], [2.0, 6.0]]);
        assert_eq!(quad.bounds(), (2.0, 1.0, 9.0, 7.0));
    }
}
