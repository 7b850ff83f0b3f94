//! CTC text recognition.

use std::path::Path;

use image::RgbImage;
use ndarray::{Array4, ArrayView2, Axis, s};

use super::preprocess::{self, LINE_HEIGHT};
use super::session::OnnxModel;
use crate::{Error, Result};

const STAGE: &str = "recognition";

/// Crops recognized per model run.
const BATCH_SIZE: usize = 6;

/// CTC blank class.
const BLANK: usize = 0;

/// Text recognizer with its character dictionary.
pub(crate) struct TextRecognizer {
    model: OnnxModel,
    charset: Vec<String>,
}

impl TextRecognizer {
    pub fn new(model: OnnxModel, charset: Vec<String>) -> Self {
        Self { model, charset }
    }

    /// Number of characters the recognizer can emit.
    pub fn charset_len(&self) -> usize {
        self.charset.len()
    }

    /// Recognizes every crop, returning `(text, score)` in input order.
    pub fn recognize(&mut self, crops: &[RgbImage]) -> Result<Vec<(String, f32)>> {
        // Batching crops of similar width keeps padding small.
        let mut order: Vec<usize> = (0..crops.len()).collect();
        order.sort_by(|&a, &b| {
            preprocess::aspect_ratio(&crops[a]).total_cmp(&preprocess::aspect_ratio(&crops[b]))
        });

        let mut results = vec![(String::new(), 0.0); crops.len()];

        for batch in order.chunks(BATCH_SIZE) {
            let max_ratio = batch
                .iter()
                .map(|&i| preprocess::aspect_ratio(&crops[i]))
                .fold(0.0f32, f32::max);
            let width = preprocess::rec_batch_width(max_ratio);

            let mut input =
                Array4::<f32>::zeros((batch.len(), 3, LINE_HEIGHT as usize, width as usize));
            for (row, &i) in batch.iter().enumerate() {
                input
                    .index_axis_mut(Axis(0), row)
                    .assign(&preprocess::rec_tensor(&crops[i], width));
            }

            let output = self.model.run(STAGE, input)?;
            let shape = output.shape();
            if shape.len() != 3 || shape[0] != batch.len() {
                return Err(Error::inference(
                    STAGE,
                    format!("unexpected output shape {shape:?}"),
                ));
            }

            for (row, &i) in batch.iter().enumerate() {
                results[i] = ctc_greedy_decode(output.slice(s![row, .., ..]), &self.charset);
            }
        }

        Ok(results)
    }
}

/// Reads the dictionary, one character per line, and appends the space class.
pub(crate) fn load_charset(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::dictionary(format!("{}: {e}", path.display())))?;
    parse_charset(&content)
}

fn parse_charset(content: &str) -> Result<Vec<String>> {
    let mut charset: Vec<String> = content
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();

    if charset.iter().all(String::is_empty) {
        return Err(Error::dictionary("dictionary is empty"));
    }

    charset.push(" ".to_string());
    Ok(charset)
}

/// Greedy CTC decoding of a `T x C` probability matrix.
///
/// Repeated classes collapse and the blank class is skipped. The score is the
/// mean probability of the emitted characters, zero when nothing is emitted.
pub(crate) fn ctc_greedy_decode(probs: ArrayView2<f32>, charset: &[String]) -> (String, f32) {
    let mut text = String::new();
    let mut score_sum = 0.0f32;
    let mut emitted = 0usize;
    let mut previous = None;

    for step in probs.outer_iter() {
        let (class, prob) = step
            .iter()
            .copied()
            .enumerate()
            .fold((BLANK, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 { (i, p) } else { best }
            });

        if class != BLANK
            && previous != Some(class)
            && let Some(ch) = charset.get(class - 1)
        {
            text.push_str(ch);
            score_sum += prob;
            emitted += 1;
        }
        previous = Some(class);
    }

    let score = if emitted > 0 {
        score_sum / emitted as f32
    } else {
        0.0
    };
    (text, score)
}
