/// The number of values representing bounding box coordinates in YOLO format.
///
/// YOLO format uses 4 values: [center_x, center_y, width, height]
/// This constant defines the offset where class scores begin
/// in each proposal of the model output tensor.
pub const CXYWH_OFFSET: usize = 4;

/// Side length of the square model input, in pixels.
///
/// Uploaded images are resampled to `INPUT_SIZE x INPUT_SIZE` regardless of
/// their aspect ratio, and box coordinates come back in this space.
pub const INPUT_SIZE: u32 = 2176;

/// Number of color channels in the input image (RGB).
pub const INPUT_CHANNELS: usize = 3;

/// Batch size for model inference.
pub const BATCH_SIZE: usize = 1;

/// Minimum class score for keeping a proposal.
///
/// Proposals whose best class score is below this floor are dropped before
/// suppression.
pub const PROBA_THRESHOLD: f32 = 0.2;

/// IoU threshold for Non-Maximum Suppression (NMS).
///
/// A candidate whose IoU with an already selected detection is at or above
/// this value is suppressed.
pub const NMS_IOU_THRESHOLD: f32 = 0.3;

/// Name of the model input tensor.
pub const INPUT_NAME: &str = "images";

/// Name of the model output tensor.
pub const OUTPUT_NAME: &str = "output0";

/// Number of intra-op threads used by the ONNX Runtime session.
pub const INTRA_THREADS: usize = 4;

/// Label used when the configuration does not provide a class table.
pub const DEFAULT_LABEL: &str = "0";

/// Environment variable naming the default ONNX model path for the CLI.
pub const MODEL_PATH_ENV_NAME: &str = "SEASCAN_MODEL";
