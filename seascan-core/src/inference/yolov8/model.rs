use std::path::Path;

use derive_builder::Builder;
use image::imageops::FilterType;
use ndarray::{Array3, Array4};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    analysis::{labels::LabelTable, nms::SuppressionMode},
    consts::*,
    error::*,
    inference::model::Model,
};

/// Model input, shape `[1, 3, S, S]`, channel first, values in `[0, 1]`.
pub type Yolov8Input = Array4<f32>;
/// Raw model output, shape `[1, 4 + C, N]`.
pub type Yolov8Output = Array3<f32>;

/// Resampling filter used to bring uploads to the model input size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Detection pipeline settings.
///
/// Everything that shapes the decode and suppression steps lives here, so a
/// caller can load it from a JSON file or assemble it with
/// [`DetectorConfigBuilder`].
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct DetectorConfig {
    /// Side length `S` of the square model input.
    pub input_size: u32,
    /// Proposals whose best class score is below this value are dropped.
    pub confidence_floor: f32,
    /// Candidates overlapping a selected detection at or above this IoU are
    /// suppressed.
    pub iou_threshold: f32,
    pub suppression: SuppressionMode,
    /// Class index to label, in model output order.
    pub labels: LabelTable,
    pub filter: ResizeFilter,
    pub intra_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: INPUT_SIZE,
            confidence_floor: PROBA_THRESHOLD,
            iou_threshold: NMS_IOU_THRESHOLD,
            suppression: SuppressionMode::ClassAgnostic,
            labels: LabelTable::default(),
            filter: ResizeFilter::default(),
            intra_threads: INTRA_THREADS,
        }
    }
}

fn check(
    input_size: u32,
    confidence_floor: f32,
    iou_threshold: f32,
    label_count: usize,
) -> Result<(), String> {
    if input_size == 0 {
        return Err("input_size must be positive".to_string());
    }
    if !(0.0..=1.0).contains(&confidence_floor) {
        return Err(format!("confidence_floor {} not in [0, 1]", confidence_floor));
    }
    if !(iou_threshold > 0.0 && iou_threshold <= 1.0) {
        return Err(format!("iou_threshold {} not in (0, 1]", iou_threshold));
    }
    if label_count == 0 {
        return Err("labels must not be empty".to_string());
    }
    Ok(())
}

impl DetectorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = DetectorConfig::default();
        check(
            self.input_size.unwrap_or(defaults.input_size),
            self.confidence_floor.unwrap_or(defaults.confidence_floor),
            self.iou_threshold.unwrap_or(defaults.iou_threshold),
            self.labels.as_ref().unwrap_or(&defaults.labels).len(),
        )
    }
}

impl DetectorConfig {
    pub fn builder() -> DetectorConfigBuilder {
        DetectorConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), SeascanError> {
        check(
            self.input_size,
            self.confidence_floor,
            self.iou_threshold,
            self.labels.len(),
        )
        .map_err(|message| SeascanError::ConfigBuild {
            source: DetectorConfigBuilderError::ValidationError(message),
        })
    }

    /// Loads and validates a JSON config; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SeascanError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).context(IoReadSnafu {
            path: path.to_string_lossy(),
        })?;
        let config: Self = serde_json::from_str(&content).context(ConfigParseSnafu {
            path: path.to_string_lossy(),
        })?;
        config.validate()?;

        Ok(config)
    }

    /// Expected `[batch, 4 + C]` prefix of the raw output shape.
    pub fn output_rows(&self) -> usize {
        CXYWH_OFFSET + self.labels.len()
    }
}

pub struct Yolov8 {
    config: DetectorConfig,
}

impl Yolov8 {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }
}

impl Default for Yolov8 {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl Model for Yolov8 {
    type Input = Yolov8Input;

    type Output = Yolov8Output;
    type Config = DetectorConfig;

    const INPUT_NAME: &'static str = INPUT_NAME;

    const OUTPUT_NAME: &'static str = OUTPUT_NAME;

    const MODEL_NAME: &'static str = "yolov8";

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.input_size, 2176);
        assert_eq!(config.confidence_floor, 0.2);
        assert_eq!(config.iou_threshold, 0.3);
        assert_eq!(config.output_rows(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() -> Result<(), Box<dyn std::error::Error>> {
        let config = DetectorConfig::builder()
            .input_size(640)
            .confidence_floor(0.5)
            .labels(LabelTable::new(["bottle", "bag"]))
            .build()?;
        assert_eq!(config.input_size, 640);
        assert_eq!(config.confidence_floor, 0.5);
        assert_eq!(config.iou_threshold, NMS_IOU_THRESHOLD);
        assert_eq!(config.output_rows(), 6);

        assert!(DetectorConfig::builder().confidence_floor(1.5).build().is_err());
        assert!(DetectorConfig::builder().iou_threshold(0.0).build().is_err());
        assert!(
            DetectorConfig::builder()
                .labels(LabelTable::new(Vec::<String>::new()))
                .build()
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_partial_json() -> Result<(), Box<dyn std::error::Error>> {
        let config: DetectorConfig = serde_json::from_str(
            r#"{
                "iou_threshold": 0.45,
                "suppression": "per_class",
                "labels": ["a", "b"],
                "filter": "triangle"
            }"#,
        )?;
        assert_eq!(config.iou_threshold, 0.45);
        assert_eq!(config.suppression, SuppressionMode::PerClass);
        assert_eq!(config.labels.len(), 2);
        assert_eq!(config.filter, ResizeFilter::Triangle);
        assert_eq!(config.input_size, INPUT_SIZE);
        Ok(())
    }

    #[test]
    fn test_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let path =
            std::env::temp_dir().join(format!("seascan-config-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"confidence_floor": 0.35}"#)?;
        let config = DetectorConfig::from_json_file(&path)?;
        assert_eq!(config.confidence_floor, 0.35);

        std::fs::write(&path, r#"{"confidence_floor": 2.0}"#)?;
        assert!(matches!(
            DetectorConfig::from_json_file(&path),
            Err(SeascanError::ConfigBuild { .. })
        ));

        std::fs::write(&path, "not json")?;
        assert!(matches!(
            DetectorConfig::from_json_file(&path),
            Err(SeascanError::ConfigParse { .. })
        ));

        std::fs::remove_file(&path)?;
        Ok(())
    }
}
