//! Local PaddleOCR configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default base directory holding the model folders.
pub const DEFAULT_MODEL_DIR: &str = "paddleocr_models";

/// Default detection model folder.
pub const DEFAULT_DET_MODEL: &str = "en_PP-OCRv3_det_infer";

/// Default recognition model folder.
pub const DEFAULT_REC_MODEL: &str = "en_PP-OCRv4_rec_infer";

/// Default angle classification model folder.
pub const DEFAULT_CLS_MODEL: &str = "ch_ppocr_mobile_v2.0_cls_infer";

/// Default character dictionary, relative to the recognition folder.
pub const DEFAULT_REC_DICT: &str = "en_dict.txt";

/// Default ONNX file name inside each model folder.
pub const DEFAULT_MODEL_FILE: &str = "inference.onnx";

/// Configuration for the local PaddleOCR pipeline.
///
/// Paths are resolved into a [`ModelLayout`] before the engine is created.
///
/// [`ModelLayout`]: crate::ModelLayout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PaddleConfig {
    /// Base directory containing the bundled model folders
    #[cfg_attr(
        feature = "config",
        arg(long = "model-dir", env = "PADDLE_MODEL_DIR", default_value = DEFAULT_MODEL_DIR)
    )]
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Detection model folder name
    #[cfg_attr(
        feature = "config",
        arg(long = "det-model", env = "PADDLE_DET_MODEL", default_value = DEFAULT_DET_MODEL)
    )]
    #[serde(default = "default_det_model")]
    pub det_model: String,

    /// Recognition model folder name
    #[cfg_attr(
        feature = "config",
        arg(long = "rec-model", env = "PADDLE_REC_MODEL", default_value = DEFAULT_REC_MODEL)
    )]
    #[serde(default = "default_rec_model")]
    pub rec_model: String,

    /// Angle classification model folder name
    #[cfg_attr(
        feature = "config",
        arg(long = "cls-model", env = "PADDLE_CLS_MODEL", default_value = DEFAULT_CLS_MODEL)
    )]
    #[serde(default = "default_cls_model")]
    pub cls_model: String,

    /// Character dictionary file inside the recognition folder
    #[cfg_attr(
        feature = "config",
        arg(long = "rec-dict", env = "PADDLE_REC_DICT", default_value = DEFAULT_REC_DICT)
    )]
    #[serde(default = "default_rec_dict")]
    pub rec_dict: String,

    /// ONNX file name inside each model folder
    #[cfg_attr(
        feature = "config",
        arg(long = "model-file", env = "PADDLE_MODEL_FILE", default_value = DEFAULT_MODEL_FILE)
    )]
    #[serde(default = "default_model_file")]
    pub model_file: String,

    /// Disable angle classification even when the model folder exists
    #[cfg_attr(
        feature = "config",
        arg(long = "disable-angle-cls", env = "PADDLE_DISABLE_ANGLE_CLS")
    )]
    #[serde(default)]
    pub disable_angle_cls: bool,

    /// Minimum classifier confidence before a crop is rotated by 180 degrees
    #[cfg_attr(
        feature = "config",
        arg(long = "cls-thresh", env = "PADDLE_CLS_THRESH", default_value_t = 0.9)
    )]
    #[serde(default = "default_cls_thresh")]
    pub cls_thresh: f32,

    /// Minimum recognition score for a line to be kept
    #[cfg_attr(
        feature = "config",
        arg(long = "drop-score", env = "PADDLE_DROP_SCORE", default_value_t = 0.5)
    )]
    #[serde(default = "default_drop_score")]
    pub drop_score: f32,

    /// Threads used within a single ONNX operator
    #[cfg_attr(
        feature = "config",
        arg(long = "ort-intra-threads", env = "PADDLE_ORT_INTRA_THREADS")
    )]
    pub intra_threads: Option<usize>,

    /// Threads used across ONNX operators
    #[cfg_attr(
        feature = "config",
        arg(long = "ort-inter-threads", env = "PADDLE_ORT_INTER_THREADS", default_value_t = 1)
    )]
    #[serde(default = "default_inter_threads")]
    pub inter_threads: usize,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_DIR)
}

fn default_det_model() -> String {
    DEFAULT_DET_MODEL.to_string()
}

fn default_rec_model() -> String {
    DEFAULT_REC_MODEL.to_string()
}

fn default_cls_model() -> String {
    DEFAULT_CLS_MODEL.to_string()
}

fn default_rec_dict() -> String {
    DEFAULT_REC_DICT.to_string()
}

fn default_model_file() -> String {
    DEFAULT_MODEL_FILE.to_string()
}

fn default_cls_thresh() -> f32 {
    0.9
}

fn default_drop_score() -> f32 {
    0.5
}

fn default_inter_threads() -> usize {
    1
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            det_model: default_det_model(),
            rec_model: default_rec_model(),
            cls_model: default_cls_model(),
            rec_dict: default_rec_dict(),
            model_file: default_model_file(),
            disable_angle_cls: false,
            cls_thresh: default_cls_thresh(),
            drop_score: default_drop_score(),
            intra_threads: None,
            inter_threads: default_inter_threads(),
        }
    }
}

impl PaddleConfig {
    /// Creates a configuration rooted at the given model directory.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the recognition score threshold.
    pub fn with_drop_score(mut self, drop_score: f32) -> Self {
        self.drop_score = drop_score;
        self
    }

    /// Sets the classifier rotation threshold.
    pub fn with_cls_thresh(mut self, cls_thresh: f32) -> Self {
        self.cls_thresh = cls_thresh;
        self
    }

    /// Disables angle classification.
    pub fn without_angle_cls(mut self) -> Self {
        self.disable_angle_cls = true;
        self
    }

    /// Returns the intra-op thread count, capped at four by default.
    pub fn intra_threads(&self) -> usize {
        self.intra_threads.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 4)
        })
    }

    /// Returns the inter-op thread count.
    pub fn inter_threads(&self) -> usize {
        self.inter_threads.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bundled_layout() {
        let config = PaddleConfig::default();
        assert_eq!(config.model_dir, PathBuf::from("paddleocr_models"));
        assert_eq!(config.det_model, "en_PP-OCRv3_det_infer");
        assert_eq!(config.rec_model, "en_PP-OCRv4_rec_infer");
        assert_eq!(config.cls_model, "ch_ppocr_mobile_v2.0_cls_infer");
        assert_eq!(config.rec_dict, "en_dict.txt");
        assert_eq!(config.drop_score, 0.5);
        assert!(!config.disable_angle_cls);
    }

    #[test]
    fn thread_counts_are_positive() {
        let config = PaddleConfig {
            intra_threads: Some(0),
            inter_threads: 0,
            ..PaddleConfig::default()
        };
        assert!(config.intra_threads() >= 1);
        assert_eq!(config.inter_threads(), 1);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: PaddleConfig =
            serde_json::from_str(r#"{"model_dir": "/opt/models"}"#).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.cls_thresh, 0.9);
    }
}
