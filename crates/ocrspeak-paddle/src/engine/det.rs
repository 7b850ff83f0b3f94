//! DB text detection and box post-processing.

use image::RgbImage;
use ndarray::{Array2, ArrayD, Axis, s};
use ocrspeak_core::Quad;

use super::preprocess;
use super::session::OnnxModel;
use crate::{Error, Result};

const STAGE: &str = "detection";

/// Probability above which a pixel belongs to text.
const BINARY_THRESH: f32 = 0.3;
/// Minimum mean probability inside a box.
const BOX_THRESH: f32 = 0.5;
/// Upper bound on connected components considered per image.
const MAX_CANDIDATES: usize = 1000;
/// Box expansion ratio applied before mapping back to the source image.
const UNCLIP_RATIO: f32 = 1.6;
/// Shortest accepted box side, in probability map pixels.
const MIN_SIZE: f32 = 3.0;
/// Boxes whose tops differ by less than this are read as the same line.
const SAME_LINE_PX: f32 = 10.0;

/// Text region detector.
pub(crate) struct TextDetector {
    model: OnnxModel,
}

impl TextDetector {
    pub fn new(model: OnnxModel) -> Self {
        Self { model }
    }

    /// Detects text regions in source image coordinates, in reading order.
    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<Quad>> {
        let input = preprocess::det_tensor(image).insert_axis(Axis(0));
        let output = self.model.run(STAGE, input)?;
        let prob = prob_map(output)?;

        Ok(boxes_from_prob_map(&prob, image.width(), image.height()))
    }
}

/// Reduces the model output to a single `H x W` probability map.
fn prob_map(output: ArrayD<f32>) -> Result<Array2<f32>> {
    let (h, w) = match output.shape() {
        [1, 1, h, w] | [1, h, w] => (*h, *w),
        other => {
            return Err(Error::inference(
                STAGE,
                format!("unexpected output shape {other:?}"),
            ));
        }
    };

    output
        .into_shape_with_order((h, w))
        .map_err(|e| Error::inference(STAGE, e))
}

/// Turns a probability map into sorted boxes scaled to `src_w` x `src_h`.
pub(crate) fn boxes_from_prob_map(prob: &Array2<f32>, src_w: u32, src_h: u32) -> Vec<Quad> {
    let (h, w) = prob.dim();
    if h == 0 || w == 0 {
        return Vec::new();
    }

    let scale_x = src_w as f32 / w as f32;
    let scale_y = src_h as f32 / h as f32;

    let mut visited = Array2::from_elem((h, w), false);
    let mut boxes = Vec::new();
    let mut candidates = 0;

    'scan: for y in 0..h {
        for x in 0..w {
            if visited[[y, x]] || prob[[y, x]] <= BINARY_THRESH {
                continue;
            }
            if candidates == MAX_CANDIDATES {
                break 'scan;
            }
            candidates += 1;

            let (min_x, min_y, max_x, max_y) = fill_component(prob, &mut visited, x, y);
            let box_w = (max_x - min_x + 1) as f32;
            let box_h = (max_y - min_y + 1) as f32;
            if box_w.min(box_h) < MIN_SIZE {
                continue;
            }

            let score = prob
                .slice(s![min_y..=max_y, min_x..=max_x])
                .mean()
                .unwrap_or(0.0);
            if score < BOX_THRESH {
                continue;
            }

            let distance = box_w * box_h * UNCLIP_RATIO / (2.0 * (box_w + box_h));
            let (ux0, uy0) = (min_x as f32 - distance, min_y as f32 - distance);
            let (ux1, uy1) = ((max_x + 1) as f32 + distance, (max_y + 1) as f32 + distance);
            if (ux1 - ux0).min(uy1 - uy0) < MIN_SIZE + 2.0 {
                continue;
            }

            let x0 = (ux0 * scale_x).round().clamp(0.0, src_w as f32);
            let y0 = (uy0 * scale_y).round().clamp(0.0, src_h as f32);
            let x1 = (ux1 * scale_x).round().clamp(0.0, src_w as f32);
            let y1 = (uy1 * scale_y).round().clamp(0.0, src_h as f32);
            if x1 - x0 <= 3.0 || y1 - y0 <= 3.0 {
                continue;
            }

            boxes.push(Quad::from_bounds(x0, y0, x1, y1));
        }
    }

    sort_reading_order(&mut boxes);
    boxes
}

/// Flood-fills the component at `(x, y)` and returns its inclusive bounds.
fn fill_component(
    prob: &Array2<f32>,
    visited: &mut Array2<bool>,
    x: usize,
    y: usize,
) -> (usize, usize, usize, usize) {
    let (h, w) = prob.dim();
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
    let mut stack = vec![(x, y)];
    visited[[y, x]] = true;

    while let Some((cx, cy)) = stack.pop() {
        min_x = min_x.min(cx);
        max_x = max_x.max(cx);
        min_y = min_y.min(cy);
        max_y = max_y.max(cy);

        let neighbours = [
            (cx.wrapping_sub(1), cy),
            (cx + 1, cy),
            (cx, cy.wrapping_sub(1)),
            (cx, cy + 1),
        ];
        for (nx, ny) in neighbours {
            if nx < w && ny < h && !visited[[ny, nx]] && prob[[ny, nx]] > BINARY_THRESH {
                visited[[ny, nx]] = true;
                stack.push((nx, ny));
            }
        }
    }

    (min_x, min_y, max_x, max_y)
}

/// Sorts top to bottom, then left to right within a line.
fn sort_reading_order(boxes: &mut [Quad]) {
    boxes.sort_by(|a, b| {
        let (a, b) = (a.top_left(), b.top_left());
        a[1].total_cmp(&b[1]).then(a[0].total_cmp(&b[0]))
    });

    for i in 0..boxes.len().saturating_sub(1) {
        for j in (0..=i).rev() {
            let (upper, lower) = (boxes[j].top_left(), boxes[j + 1].top_left());
            if (lower[1] - upper[1]).abs() < SAME_LINE_PX && lower[0] < upper[0] {
                boxes.swap(j, j + 1);
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(prob: &mut Array2<f32>, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>, v: f32) {
        prob.slice_mut(s![rows, cols]).fill(v);
    }

    #[test]
    fn finds_and_scales_boxes() {
        let mut prob = Array2::<f32>::zeros((64, 64));
        fill(&mut prob, 40..50, 5..40, 0.9);
        fill(&mut prob, 10..20, 5..40, 0.9);

        let boxes = boxes_from_prob_map(&prob, 128, 128);
        assert_eq!(boxes.len(), 2);

        let (x0, y0, x1, y1) = boxes[0].bounds();
        assert!(y0 < 20.0 && y1 > 40.0);
        assert!(x0 <= 10.0 && x1 >= 80.0);
        assert!(boxes[1].bounds().1 > y0);
    }

    #[test]
    fn drops_weak_and_tiny_components() {
        let mut prob = Array2::<f32>::zeros((64, 64));
        fill(&mut prob, 10..20, 5..40, 0.4);
        fill(&mut prob, 40..42, 40..42, 0.95);

        assert!(boxes_from_prob_map(&prob, 64, 64).is_empty());
    }

    #[test]
    fn same_line_boxes_read_left_to_right() {
        let mut boxes = vec![
            Quad::from_bounds(100.0, 12.0, 150.0, 30.0),
            Quad::from_bounds(10.0, 15.0, 60.0, 30.0),
            Quad::from_bounds(10.0, 60.0, 60.0, 80.0),
        ];
        sort_reading_order(&mut boxes);

        let lefts: Vec<f32> = boxes.iter().map(|b| b.top_left()[0]).collect();
        let tops: Vec<f32> = boxes.iter().map(|b| b.top_left()[1]).collect();
        assert_eq!(lefts, vec![10.0, 100.0, 10.0]);
        assert_eq!(tops, vec![15.0, 12.0, 60.0]);
    }

    #[test]
    fn rejects_unexpected_output_shape() {
        let output = ArrayD::<f32>::zeros(vec![2, 3]);
        assert!(matches!(prob_map(output), Err(Error::Inference { .. })));
    }

    #[test]
    fn accepts_nchw_output() {
        let output = ArrayD::<f32>::zeros(vec![1, 1, 8, 16]);
        assert_eq!(prob_map(output).unwrap().dim(), (8, 16));
    }
}
