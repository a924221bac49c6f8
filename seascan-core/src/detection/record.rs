use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use uuid::Uuid;

use crate::{detection::element::DetectionSet, geo::dms::GeoCoordinate};

/// Everything produced for one uploaded image, ready to persist.
#[derive(Clone, Debug, Serialize)]
pub struct ScanRecord {
    /// `<filename>_<uuid v4>`, unique per scan even for repeated filenames.
    pub id: String,
    pub filename: String,
    pub detections: DetectionSet,
    /// `None` when the image carries no usable geotag.
    pub geolocation: Option<GeoCoordinate>,
}

impl ScanRecord {
    pub fn new(
        filename: impl Into<String>,
        detections: DetectionSet,
        geolocation: Option<GeoCoordinate>,
    ) -> Self {
        let filename = filename.into();

        Self {
            id: format!("{}_{}", filename, Uuid::new_v4()),
            filename,
            detections,
            geolocation,
        }
    }

    pub fn object_count(&self) -> usize {
        self.detections.len()
    }

    pub fn count_by_label(&self) -> BTreeMap<Arc<str>, usize> {
        self.detections.count_by_label()
    }
}
