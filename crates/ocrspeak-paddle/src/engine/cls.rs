//! Text-line direction classification (0 or 180 degrees).

use image::RgbImage;
use image::imageops;
use ndarray::{Array4, ArrayD, Axis, s};

use super::preprocess::{self, CLS_WIDTH, LINE_HEIGHT};
use super::session::OnnxModel;
use crate::{Error, Result};

const STAGE: &str = "classification";

/// Crops classified per model run.
const BATCH_SIZE: usize = 6;

/// Index of the `180` label in the model output.
const LABEL_180: usize = 1;

/// Text-line angle classifier.
pub(crate) struct AngleClassifier {
    model: OnnxModel,
    thresh: f32,
}

impl AngleClassifier {
    pub fn new(model: OnnxModel, thresh: f32) -> Self {
        Self { model, thresh }
    }

    /// Rotates upside-down crops in place and returns how many were turned.
    pub fn correct(&mut self, crops: &mut [RgbImage]) -> Result<usize> {
        let mut rotated = 0;

        for (batch_index, batch) in crops.chunks_mut(BATCH_SIZE).enumerate() {
            let mut input =
                Array4::<f32>::zeros((batch.len(), 3, LINE_HEIGHT as usize, CLS_WIDTH as usize));
            for (i, crop) in batch.iter().enumerate() {
                input
                    .index_axis_mut(Axis(0), i)
                    .assign(&preprocess::cls_tensor(crop));
            }

            let output = self.model.run(STAGE, input)?;
            let labels = decode_labels(&output, batch.len())?;

            for (crop, (label, score)) in batch.iter_mut().zip(labels) {
                if is_upside_down(label, score, self.thresh) {
                    *crop = imageops::rotate180(&*crop);
                    rotated += 1;
                }
            }

            tracing::trace!(
                target: crate::TRACING_TARGET_ENGINE,
                batch = batch_index,
                size = batch.len(),
                "Classified crop batch"
            );
        }

        Ok(rotated)
    }
}

/// A crop is turned only when `180` wins with a probability above `thresh`.
fn is_upside_down(label: usize, score: f32, thresh: f32) -> bool {
    label == LABEL_180 && score > thresh
}

/// Returns `(label, probability)` per row of an `N x 2` output.
fn decode_labels(output: &ArrayD<f32>, expected: usize) -> Result<Vec<(usize, f32)>> {
    let shape = output.shape();
    if shape.len() != 2 || shape[0] != expected || shape[1] < 2 {
        return Err(Error::inference(
            STAGE,
            format!("unexpected output shape {shape:?}"),
        ));
    }

    let labels = (0..expected)
        .map(|row| {
            let probs = output.slice(s![row, ..]);
            probs
                .iter()
                .copied()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, p)| {
                    if p > best.1 { (i, p) } else { best }
                })
        })
        .collect();

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_best_label_per_row() {
        let output = ArrayD::from_shape_vec(vec![2, 2], vec![0.8, 0.2, 0.05, 0.95]).unwrap();
        let labels = decode_labels(&output, 2).unwrap();
        assert_eq!(labels, vec![(0, 0.8), (1, 0.95)]);
    }

    #[test]
    fn rotates_only_above_threshold() {
        assert!(is_upside_down(LABEL_180, 0.95, 0.9));
        assert!(!is_upside_down(LABEL_180, 0.9, 0.9));
        assert!(!is_upside_down(0, 0.99, 0.9));
    }

    #[test]
    fn rejects_wrong_batch_size() {
        let output = ArrayD::<f32>::zeros(vec![3, 2]);
        assert!(decode_labels(&output, 2).is_err());
    }
}
