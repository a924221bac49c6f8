mod backend;
mod decode;
mod draw;
mod model;
mod preprocess;
mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use backend::OrtBackend;
pub use decode::decode;
pub use draw::{draw_detections, save_annotated};
pub use model::{
    DetectorConfig, DetectorConfigBuilder, DetectorConfigBuilderError, ResizeFilter, Yolov8,
    Yolov8Input, Yolov8Output,
};
pub use preprocess::{ImageSize, NormalizedImage, decode_image, normalize, normalize_image};
pub use session::YoloSession;
