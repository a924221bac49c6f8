pub mod model;
pub mod yolov8;
