use serde::{Deserialize, Serialize};
use tracing::*;

use crate::detection::element::{Candidate, DetectionSet};

/// Which candidate pairs may suppress each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionMode {
    /// Any two overlapping candidates compete, whatever their class.
    #[default]
    ClassAgnostic,
    /// Only candidates sharing a class id compete.
    PerClass,
}

/// Turns a candidate list into a non-overlapping detection set.
pub trait Suppressor {
    fn suppress(&self, candidates: Vec<Candidate>) -> DetectionSet;
}

/// Greedy non-maximum suppression.
///
/// Candidates are visited by descending confidence; each surviving one is
/// selected and knocks out every later candidate whose IoU with it is at or
/// above `iou_threshold`. Cost is quadratic in the candidate count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GreedyNms {
    pub iou_threshold: f32,
    pub mode: SuppressionMode,
}

impl GreedyNms {
    pub fn new(iou_threshold: f32, mode: SuppressionMode) -> Self {
        Self {
            iou_threshold,
            mode,
        }
    }

    fn competes(&self, selected: &Candidate, other: &Candidate) -> bool {
        match self.mode {
            SuppressionMode::ClassAgnostic => true,
            SuppressionMode::PerClass => selected.class_id == other.class_id,
        }
    }
}

impl Suppressor for GreedyNms {
    fn suppress(&self, mut candidates: Vec<Candidate>) -> DetectionSet {
        if candidates.len() <= 1 {
            return DetectionSet::from_selected(candidates);
        }

        let raw_len = candidates.len();

        // Stable: equal confidences keep their input order
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut keep_flags = vec![true; candidates.len()];

        for selected_index in 0..candidates.len() {
            if !keep_flags[selected_index] {
                continue;
            }

            let (head, tail) = candidates.split_at(selected_index + 1);
            let selected = &head[selected_index];

            for (offset, other) in tail.iter().enumerate() {
                let other_index = selected_index + 1 + offset;
                if !keep_flags[other_index] || !self.competes(selected, other) {
                    continue;
                }

                if selected.iou(other) >= self.iou_threshold {
                    keep_flags[other_index] = false;
                }
            }
        }

        let selected = candidates
            .into_iter()
            .zip(keep_flags)
            .filter_map(|(candidate, keep)| keep.then_some(candidate))
            .collect::<Vec<_>>();

        debug!(
            candidates = raw_len,
            kept = selected.len(),
            iou_threshold = self.iou_threshold,
            "non-maximum suppression"
        );

        DetectionSet::from_selected(selected)
    }
}

/// Class-agnostic greedy NMS over `candidates`.
pub fn suppress(candidates: Vec<Candidate>, iou_threshold: f32) -> DetectionSet {
    GreedyNms::new(iou_threshold, SuppressionMode::ClassAgnostic).suppress(candidates)
}
