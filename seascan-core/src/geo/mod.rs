pub mod dms;
pub mod exif;
