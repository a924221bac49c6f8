pub mod bbox;
pub mod labels;
pub mod nms;
