//! Rendering of OCR results onto the source image.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use ocrspeak_core::Quad;

use crate::{Error, Result, TRACING_TARGET_DRAW};

const OUTLINE: Rgb<u8> = Rgb([255, 0, 0]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

/// A TrueType or OpenType font on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResource {
    path: PathBuf,
}

impl FontResource {
    /// Creates a font resource for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the font file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the font file currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads and parses the font file.
    pub fn load(&self) -> Result<FontVec> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| Error::font(format!("cannot read '{}': {e}", self.path.display())))?;

        FontVec::try_from_vec(bytes)
            .map_err(|e| Error::font(format!("cannot parse '{}': {e}", self.path.display())))
    }
}

/// Layout parameters for [`draw_ocr`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOptions {
    /// Lines scoring below this are neither outlined nor listed.
    pub drop_score: f32,
    /// The image is scaled so its longest side has this length.
    pub image_side: u32,
    /// Width of each text panel.
    pub panel_width: u32,
    /// Font size in pixels.
    pub font_size: u32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            drop_score: 0.5,
            image_side: 600,
            panel_width: 600,
            font_size: 20,
        }
    }
}

impl DrawOptions {
    /// Default layout with the given score threshold.
    pub fn with_drop_score(drop_score: f32) -> Self {
        Self {
            drop_score,
            ..Self::default()
        }
    }

    fn keeps(&self, score: f32) -> bool {
        !score.is_nan() && score >= self.drop_score
    }

    fn line_gap(&self) -> u32 {
        self.font_size + 5
    }

    fn chars_per_row(&self) -> usize {
        ((self.panel_width / self.font_size.max(1)).saturating_sub(4) as usize).max(1)
    }
}

/// Outlines every kept region and appends text panels listing the lines.
///
/// Each kept line is written as `"{index}: {text}   {score}"`. Long lines
/// wrap, and a new panel is started when the current one is full.
pub fn draw_ocr(
    image: &DynamicImage,
    boxes: &[Quad],
    texts: &[String],
    scores: &[f32],
    font: &FontVec,
    options: &DrawOptions,
) -> Result<RgbImage> {
    if boxes.len() != texts.len() || texts.len() != scores.len() {
        return Err(Error::invalid_input(format!(
            "mismatched result lengths: {} boxes, {} texts, {} scores",
            boxes.len(),
            texts.len(),
            scores.len()
        )));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::invalid_input("image has no pixels"));
    }

    let mut outlined = image.to_rgb8();
    outline_regions(&mut outlined, boxes, scores, options);
    let scaled = scale_longest_side(&outlined, options.image_side);

    let panels = plan_panels(texts, scores, scaled.height(), options);
    let scale = PxScale::from(options.font_size as f32);
    let gap = options.line_gap() as i32;

    let width = scaled.width() + options.panel_width * panels.len() as u32;
    let mut canvas = RgbImage::from_pixel(width, scaled.height(), PAPER);
    imageops::replace(&mut canvas, &scaled, 0, 0);

    for (i, panel) in panels.iter().enumerate() {
        let left = scaled.width() + options.panel_width * i as u32;
        let right = left + options.panel_width - 1;
        for y in 0..canvas.height() {
            canvas.put_pixel(right, y, INK);
        }

        for line in panel {
            draw_text_mut(
                &mut canvas,
                INK,
                left as i32,
                gap * line.row as i32,
                scale,
                font,
                &line.text,
            );
        }
    }

    tracing::debug!(
        target: TRACING_TARGET_DRAW,
        regions = boxes.len(),
        panels = panels.len(),
        width = canvas.width(),
        height = canvas.height(),
        "Rendered OCR result"
    );

    Ok(canvas)
}

/// Draws each kept region as a closed 2 px red polygon.
fn outline_regions(image: &mut RgbImage, boxes: &[Quad], scores: &[f32], options: &DrawOptions) {
    for (quad, &score) in boxes.iter().zip(scores) {
        if !options.keeps(score) {
            continue;
        }

        for i in 0..4 {
            let [x0, y0] = quad.points[i];
            let [x1, y1] = quad.points[(i + 1) % 4];
            for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
                draw_line_segment_mut(image, (x0 + dx, y0 + dy), (x1 + dx, y1 + dy), OUTLINE);
            }
        }
    }
}

fn scale_longest_side(image: &RgbImage, side: u32) -> RgbImage {
    let longest = image.width().max(image.height()) as f32;
    let ratio = side as f32 / longest;
    let width = ((image.width() as f32 * ratio).round() as u32).max(1);
    let height = ((image.height() as f32 * ratio).round() as u32).max(1);

    if (width, height) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    }
}

/// A text row placed on a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PanelLine {
    row: u32,
    text: String,
}

/// Splits the kept lines into rows and panels.
fn plan_panels(
    texts: &[String],
    scores: &[f32],
    panel_height: u32,
    options: &DrawOptions,
) -> Vec<Vec<PanelLine>> {
    let rows_per_panel = (panel_height / options.line_gap()) as i64 - 1;
    let chunk = options.chars_per_row();

    let mut panels = vec![Vec::new()];
    let mut row: i64 = 1;
    let mut index = 0;

    for (i, (text, &score)) in texts.iter().zip(scores).enumerate() {
        if !options.keeps(score) {
            continue;
        }
        index += 1;

        let mut rest: Vec<char> = text.chars().collect();
        let mut first = true;

        while display_width(&rest) >= chunk {
            let split = chunk.min(rest.len());
            let head: String = rest[..split].iter().collect();
            let line = if first {
                format!("{index}: {head}")
            } else {
                format!("    {head}")
            };
            first = false;
            place(&mut panels, row, line);
            rest.drain(..split);

            if row >= rows_per_panel {
                panels.push(Vec::new());
                row = 0;
            }
            row += 1;
        }

        let tail: String = rest.into_iter().collect();
        let line = if first {
            format!("{index}: {tail}   {score:.3}")
        } else {
            format!("  {tail}  {score:.3}")
        };
        place(&mut panels, row, line);

        if row >= rows_per_panel && i + 1 < texts.len() {
            panels.push(Vec::new());
            row = 0;
        }
        row += 1;
    }

    panels
}

fn place(panels: &mut [Vec<PanelLine>], row: i64, text: String) {
    if let Some(panel) = panels.last_mut() {
        panel.push(PanelLine {
            row: row as u32,
            text,
        });
    }
}

/// Width in panel columns: ASCII letters, digits and spaces count as half.
fn display_width(chars: &[char]) -> usize {
    let narrow = chars
        .iter()
        .filter(|c| c.is_ascii_alphabetic() || c.is_numeric() || c.is_whitespace())
        .count();
    chars.len() - narrow.div_ceil(2)
}
