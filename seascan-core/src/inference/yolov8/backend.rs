use std::path::Path;

use ndarray::{Array3, Array4, Ix3};
use ort::{
    session::{Session, builder::SessionBuilder},
    value::TensorRef,
};
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    error::*,
    inference::model::{Backend, Model},
};

/// ONNX Runtime session holding a loaded detection model.
///
/// Built once by the caller and dropped with it; every inference borrows it
/// mutably, so concurrent callers must serialize access.
pub struct OrtBackend {
    session: Session,
}

impl OrtBackend {
    pub fn from_memory(session: SessionBuilder, model: &[u8]) -> Result<Self, SeascanError> {
        let session = session
            .commit_from_memory(model)
            .context(OrtInitSnafu { stage: "commit" })?;

        Ok(Self { session })
    }

    pub fn from_file<P: AsRef<Path>>(
        session: SessionBuilder,
        path: P,
    ) -> Result<Self, SeascanError> {
        let path = path.as_ref();
        info!("Loading model from {}", path.display());

        let model = std::fs::read(path).context(ModelReadSnafu {
            path: path.to_string_lossy(),
        })?;

        Self::from_memory(session, &model)
    }
}

impl<M> Backend<M> for OrtBackend
where
    M: Model<Input = Array4<f32>, Output = Array3<f32>>,
{
    fn infer(&mut self, input: M::Input) -> Result<M::Output, SeascanError> {
        let input_name = M::INPUT_NAME;
        let output_name = M::OUTPUT_NAME;

        let output = self
            .session
            .run(ort::inputs![
                input_name => TensorRef::from_array_view(&input)
                    .context(TensorSnafu { stage: "input" })?
            ])
            .context(InferenceSnafu {})?;

        let tensor = output
            .get(output_name)
            .context(NotFoundOutputSnafu { output_name })?
            .try_extract_array::<f32>()
            .context(TensorSnafu { stage: "extract" })?;

        let shape = tensor.shape().to_vec();
        let output = tensor
            .into_dimensionality::<Ix3>()
            .ok()
            .context(ShapeContractSnafu {
                stage: "output",
                expected: "[1, 4 + C, N]",
                actual: shape,
            })?
            .to_owned();

        Ok(output)
    }
}
