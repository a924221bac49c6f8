use std::{collections::BTreeMap, sync::Arc};

use serde::{Serialize, Serializer, ser::SerializeTuple};

use crate::analysis::bbox::Bbox;

/// One detected object in original-image pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub bbox: Bbox,
    pub class_id: usize,
    pub label: Arc<str>,
    pub confidence: f32,
}

impl Candidate {
    pub fn new(bbox: Bbox, class_id: usize, label: impl Into<Arc<str>>, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            label: label.into(),
            confidence,
        }
    }

    pub fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }
}

/// Serialized as `[x1, y1, x2, y2, label, confidence]`.
impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let [x1, y1, x2, y2] = self.bbox.to_xyxy();
        let mut tuple = serializer.serialize_tuple(6)?;
        tuple.serialize_element(&x1)?;
        tuple.serialize_element(&y1)?;
        tuple.serialize_element(&x2)?;
        tuple.serialize_element(&y2)?;
        tuple.serialize_element(self.label.as_ref())?;
        tuple.serialize_element(&self.confidence)?;
        tuple.end()
    }
}

/// Detections that survived suppression, in selection order.
///
/// Only the suppression engine builds a set, so members never overlap at or
/// above the threshold they were suppressed with.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DetectionSet {
    detections: Vec<Candidate>,
}

impl DetectionSet {
    pub(crate) fn from_selected(detections: Vec<Candidate>) -> Self {
        Self { detections }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.detections.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.detections
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.detections
    }

    /// Number of detections per label, ordered by label.
    pub fn count_by_label(&self) -> BTreeMap<Arc<str>, usize> {
        let mut counts = BTreeMap::new();
        for detection in &self.detections {
            *counts.entry(Arc::clone(&detection.label)).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

impl IntoIterator for DetectionSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}
