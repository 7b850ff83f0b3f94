//! ONNX Runtime session wrapper shared by all model stages.

use ndarray::{Array4, ArrayD};
use ort::session::Session;
use ort::value::Tensor;

use crate::{Error, ModelLayout, ModelPart, PaddleConfig, Result, TRACING_TARGET_ENGINE};

/// A loaded ONNX model for one pipeline stage.
pub(crate) struct OnnxModel {
    part: ModelPart,
    session: Session,
}

impl OnnxModel {
    /// Loads the model file for `part` from the layout.
    pub fn load(layout: &ModelLayout, part: ModelPart, config: &PaddleConfig) -> Result<Self> {
        let path = layout.model_path(part);
        if !path.is_file() {
            return Err(Error::missing(part, path));
        }

        let intra = config.intra_threads();
        let inter = config.inter_threads();

        let session = Session::builder()
            .map_err(|e| Error::model_load(part, e))?
            .with_intra_threads(intra)
            .map_err(|e| Error::model_load(part, e))?
            .with_inter_threads(inter)
            .map_err(|e| Error::model_load(part, e))?
            .commit_from_file(&path)
            .map_err(|e| Error::model_load(part, e))?;

        tracing::info!(
            target: TRACING_TARGET_ENGINE,
            part = %part,
            path = %path.display(),
            intra_threads = intra,
            inter_threads = inter,
            "Loaded ONNX model"
        );

        Ok(Self { part, session })
    }

    /// Runs the model on a single NCHW input and returns its first output.
    pub fn run(&mut self, stage: &'static str, input: Array4<f32>) -> Result<ArrayD<f32>> {
        let tensor = Tensor::from_array(input).map_err(|e| Error::inference(stage, e))?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| Error::inference(stage, e))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| Error::inference(stage, e))?
            .to_owned();

        tracing::trace!(
            target: TRACING_TARGET_ENGINE,
            part = %self.part,
            shape = ?output.shape(),
            "Model run finished"
        );

        Ok(output)
    }
}
