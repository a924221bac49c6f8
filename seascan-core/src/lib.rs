pub mod analysis;
pub mod consts;
pub mod detection;
pub mod error;
pub mod geo;
pub mod inference;
pub mod scan;

// Re-export commonly used types
pub use analysis::nms::{GreedyNms, SuppressionMode, Suppressor, suppress};
pub use detection::{
    element::{Candidate, DetectionSet},
    record::ScanRecord,
};
pub use error::SeascanError;
pub use geo::dms::{Dms, GeoCoordinate, GpsTags, Hemisphere, Rational};
pub use inference::yolov8::{DetectorConfig, OrtBackend, YoloSession, Yolov8};
pub use scan::scanner::{ScanConfig, Scanner, Upload};
