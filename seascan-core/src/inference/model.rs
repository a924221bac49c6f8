use image::DynamicImage;
use ort::{
    execution_providers::CPUExecutionProvider,
    session::{
        Session,
        builder::{GraphOptimizationLevel, SessionBuilder},
    },
};
use snafu::ResultExt;

use crate::error::{OrtInitSnafu, SeascanError};

pub trait Model {
    type Input;
    type Output;
    type Config;

    const INPUT_NAME: &'static str;
    const OUTPUT_NAME: &'static str;
    const MODEL_NAME: &'static str;

    fn config(&self) -> &Self::Config;
}

/// The inference engine behind a session: takes the model input tensor and
/// returns its raw output tensor.
pub trait Backend<M: Model> {
    fn infer(&mut self, input: M::Input) -> Result<M::Output, SeascanError>;
}

pub trait OnnxSession<M: Model> {
    type Output;
    type Extra;

    fn preprocess(&self, image: &DynamicImage) -> Result<(M::Input, Self::Extra), SeascanError>;

    fn postprocess(
        &self,
        output: M::Output,
        extra: Self::Extra,
    ) -> Result<Self::Output, SeascanError>;

    fn infer(&mut self, input: M::Input) -> Result<M::Output, SeascanError>;

    fn run(&mut self, image: &DynamicImage) -> Result<Self::Output, SeascanError> {
        let (input, extra) = self.preprocess(image)?;

        let output = self.infer(input)?;

        self.postprocess(output, extra)
    }
}

/// common session builder
pub fn session_builder(intra_threads: usize) -> Result<SessionBuilder, SeascanError> {
    let session_builder = Session::builder()
        .context(OrtInitSnafu { stage: "builder" })?
        .with_execution_providers(vec![
            #[cfg(all(feature = "coreml", target_os = "macos"))]
            {
                use ort::execution_providers::CoreMLExecutionProvider;
                use ort::execution_providers::coreml::*;
                CoreMLExecutionProvider::default()
                    .with_model_format(CoreMLModelFormat::MLProgram)
                    .build()
            },
            #[cfg(feature = "cuda")]
            {
                use ort::execution_providers::CUDAExecutionProvider;
                CUDAExecutionProvider::default().build()
            },
            CPUExecutionProvider::default().build(),
        ])
        .context(OrtInitSnafu { stage: "provider" })?
        .with_optimization_level(GraphOptimizationLevel::Level1)
        .context(OrtInitSnafu {
            stage: "optimization",
        })?
        .with_intra_threads(intra_threads)
        .context(OrtInitSnafu {
            stage: "intra-threads",
        })?;

    Ok(session_builder)
}
