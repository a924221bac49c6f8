use std::path::Path;

use image::DynamicImage;
use tracing::*;

use crate::{
    analysis::nms::{GreedyNms, Suppressor},
    detection::element::DetectionSet,
    error::SeascanError,
    inference::{
        model::{Backend, Model, OnnxSession, session_builder},
        yolov8::{
            DetectorConfig, ImageSize, OrtBackend, Yolov8, decode, decode_image, normalize_image,
        },
    },
};

/// Detection pipeline: normalize, infer, decode, suppress.
pub struct YoloSession<B = OrtBackend> {
    backend: B,
    model: Yolov8,
}

impl<B> YoloSession<B> {
    pub fn new(backend: B, model: Yolov8) -> Self {
        Self { backend, model }
    }

    pub fn config(&self) -> &DetectorConfig {
        self.model.config()
    }

    pub fn suppressor(&self) -> GreedyNms {
        let config = self.model.config();
        GreedyNms::new(config.iou_threshold, config.suppression)
    }
}

impl YoloSession<OrtBackend> {
    /// Loads an ONNX model from disk with the shared session settings.
    pub fn from_model_file<P: AsRef<Path>>(
        path: P,
        config: DetectorConfig,
    ) -> Result<Self, SeascanError> {
        let backend = OrtBackend::from_file(session_builder(config.intra_threads)?, path)?;
        info!("{} session initialized", Yolov8::MODEL_NAME);

        Ok(Self::new(backend, Yolov8::new(config)))
    }
}

impl<B: Backend<Yolov8>> YoloSession<B> {
    /// Runs the full pipeline on encoded image bytes.
    pub fn detect(&mut self, bytes: &[u8]) -> Result<DetectionSet, SeascanError> {
        let image = decode_image(bytes)?;
        self.run(&image)
    }
}

impl<B: Backend<Yolov8>> OnnxSession<Yolov8> for YoloSession<B> {
    type Output = DetectionSet;
    type Extra = ImageSize;

    fn preprocess(
        &self,
        image: &DynamicImage,
    ) -> Result<(<Yolov8 as Model>::Input, Self::Extra), SeascanError> {
        let config = self.model.config();
        let normalized = normalize_image(image, config.input_size, config.filter)?;

        Ok((normalized.tensor, normalized.original))
    }

    fn postprocess(
        &self,
        output: <Yolov8 as Model>::Output,
        extra: Self::Extra,
    ) -> Result<Self::Output, SeascanError> {
        let config = self.model.config();

        let candidates = decode(
            output.view(),
            extra,
            &config.labels,
            config.input_size,
            config.confidence_floor,
        )?;

        let detections = self.suppressor().suppress(candidates);
        info!(
            width = extra.width,
            height = extra.height,
            detections = detections.len(),
            "detection finished"
        );

        Ok(detections)
    }

    fn infer(
        &mut self,
        input: <Yolov8 as Model>::Input,
    ) -> Result<<Yolov8 as Model>::Output, SeascanError> {
        self.backend.infer(input)
    }
}
