use snafu::prelude::*;

use crate::inference::yolov8::DetectorConfigBuilderError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SeascanError {
    #[snafu(display("Ort Session init stage `{}` error: {}", stage, source))]
    OrtInit {
        source: ort::error::Error,
        stage: String,
    },
    #[snafu(display("Build Tensor for `{}` error: {}", stage, source))]
    Tensor {
        source: ort::error::Error,
        stage: String,
    },
    #[snafu(display("Onnx Inference error: {}", source))]
    Inference { source: ort::error::Error },
    #[snafu(display("Onnx Output can not found {}", output_name))]
    NotFoundOutput { output_name: String },
    #[snafu(display(
        "Tensor shape contract violated at `{}`: expected {}, got {:?}",
        stage,
        expected,
        actual
    ))]
    ShapeContract {
        stage: String,
        expected: String,
        actual: Vec<usize>,
    },
    #[snafu(display("Image decode error: {}", source))]
    Decode { source: image::ImageError },
    #[snafu(display("Image has zero width or height"))]
    EmptyImage,
    #[snafu(display("Geolocation data not found in image metadata: missing `{}`", tag))]
    GeolocationMissing { tag: String },
    #[snafu(display("Invalid rational value `{}`", value))]
    InvalidRational { value: String },
    #[snafu(display("Invalid hemisphere reference `{}` for `{}`", value, tag))]
    InvalidHemisphere { tag: String, value: String },
    #[snafu(display("{} {} out of range", axis, value))]
    CoordinateOutOfRange { axis: String, value: f64 },
    #[snafu(display("Read model `{}` error: {}", path, source))]
    ModelRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Image Write `{}` error: {}", path, source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Read `{}` error: {}", path, source))]
    IoRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Parse config `{}` error: {}", path, source))]
    ConfigParse {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Build config error: {}", source))]
    ConfigBuild { source: DetectorConfigBuilderError },
    #[snafu(display("Detection task join error: {}", source))]
    Join { source: tokio::task::JoinError },
}
