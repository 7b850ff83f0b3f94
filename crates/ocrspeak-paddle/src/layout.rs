//! Model folder layout and presence checks.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{PaddleConfig, TRACING_TARGET_LAYOUT};

/// One part of the bundled model layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelPart {
    /// Text detection model folder.
    Detection,
    /// Text recognition model folder.
    Recognition,
    /// Text-line angle classification model folder.
    Classifier,
    /// Character dictionary used by recognition.
    Dictionary,
}

impl ModelPart {
    /// All parts, in the order they are checked.
    pub const ALL: [ModelPart; 4] = [
        ModelPart::Detection,
        ModelPart::Recognition,
        ModelPart::Classifier,
        ModelPart::Dictionary,
    ];

    /// Human-readable name used in logs and reports.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelPart::Detection => "Detection model directory",
            ModelPart::Recognition => "Recognition model directory",
            ModelPart::Classifier => "Classification model directory",
            ModelPart::Dictionary => "Recognition dictionary",
        }
    }

    /// Whether OCR cannot run without this part.
    pub fn is_required(self) -> bool {
        !matches!(self, ModelPart::Classifier)
    }
}

impl fmt::Display for ModelPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Resolved filesystem paths of every model part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLayout {
    base_dir: PathBuf,
    det_dir: PathBuf,
    rec_dir: PathBuf,
    cls_dir: PathBuf,
    dict_path: PathBuf,
    model_file: String,
}

impl ModelLayout {
    /// Resolves all paths from the configuration.
    pub fn from_config(config: &PaddleConfig) -> Self {
        let base_dir = config.model_dir.clone();
        let rec_dir = base_dir.join(&config.rec_model);

        Self {
            det_dir: base_dir.join(&config.det_model),
            cls_dir: base_dir.join(&config.cls_model),
            dict_path: rec_dir.join(&config.rec_dict),
            model_file: config.model_file.clone(),
            rec_dir,
            base_dir,
        }
    }

    /// Base directory holding the model folders.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path checked for the given part: a folder, or the dictionary file.
    pub fn path(&self, part: ModelPart) -> &Path {
        match part {
            ModelPart::Detection => &self.det_dir,
            ModelPart::Recognition => &self.rec_dir,
            ModelPart::Classifier => &self.cls_dir,
            ModelPart::Dictionary => &self.dict_path,
        }
    }

    /// ONNX model file for the given part.
    ///
    /// The dictionary has no model file and resolves to the dictionary itself.
    pub fn model_path(&self, part: ModelPart) -> PathBuf {
        match part {
            ModelPart::Dictionary => self.dict_path.clone(),
            _ => self.path(part).join(&self.model_file),
        }
    }

    /// Checks which parts exist on disk.
    pub fn check(&self) -> LayoutReport {
        let parts = ModelPart::ALL
            .iter()
            .map(|&part| {
                let path = self.path(part).to_path_buf();
                let present = match part {
                    ModelPart::Dictionary => path.is_file(),
                    _ => path.is_dir(),
                };

                tracing::debug!(
                    target: TRACING_TARGET_LAYOUT,
                    part = %part,
                    path = %path.display(),
                    present,
                    "Checked model part"
                );

                PartStatus {
                    part,
                    path,
                    present,
                }
            })
            .collect();

        LayoutReport {
            base_dir: self.base_dir.clone(),
            parts,
        }
    }
}

/// Presence of a single model part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartStatus {
    /// Which part was checked.
    pub part: ModelPart,
    /// Path that was checked.
    pub path: PathBuf,
    /// Whether the path exists.
    pub present: bool,
}

/// Result of [`ModelLayout::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    base_dir: PathBuf,
    parts: Vec<PartStatus>,
}

impl LayoutReport {
    /// Status of every part.
    pub fn parts(&self) -> &[PartStatus] {
        &self.parts
    }

    /// Whether the given part exists.
    pub fn is_present(&self, part: ModelPart) -> bool {
        self.parts.iter().any(|s| s.part == part && s.present)
    }

    /// Whether angle classification can be enabled.
    pub fn use_cls(&self) -> bool {
        self.is_present(ModelPart::Classifier)
    }

    /// Required parts that are missing.
    pub fn missing_required(&self) -> Vec<&PartStatus> {
        self.parts
            .iter()
            .filter(|s| s.part.is_required() && !s.present)
            .collect()
    }

    /// Whether every required part is present.
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model directory: {}", self.base_dir.display())?;
        for status in &self.parts {
            let mark = match (status.present, status.part.is_required()) {
                (true, _) => "ok",
                (false, true) => "MISSING",
                (false, false) => "missing (optional)",
            };
            writeln!(
                f,
                "  {:<32} {:<20} {}",
                status.part.display_name(),
                mark,
                status.path.display()
            )?;
        }

        if !self.is_complete() {
            write!(
                f,
                "Copy the downloaded model folders into '{}' and restart.",
                self.base_dir.display()
            )?;
        } else if !self.use_cls() {
            write!(f, "Angle classification is disabled.")?;
        }

        Ok(())
    }
}
