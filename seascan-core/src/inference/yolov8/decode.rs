use glam::Vec2;
use ndarray::{ArrayView3, Axis, s};
use snafu::ensure;
use tracing::*;

use crate::{
    analysis::{bbox::Bbox, labels::LabelTable},
    consts::{BATCH_SIZE, CXYWH_OFFSET},
    detection::element::Candidate,
    error::*,
    inference::yolov8::ImageSize,
};

/// Turns raw model output into candidates in original-image pixels.
///
/// `output` has shape `[1, 4 + C, N]`: for each of the `N` proposals, a
/// center/size box in the `input_size x input_size` model space followed by
/// `C` class scores. Proposals whose best score is below `confidence_floor`
/// (or is NaN) are dropped. The result is unordered.
pub fn decode(
    output: ArrayView3<'_, f32>,
    original: ImageSize,
    labels: &LabelTable,
    input_size: u32,
    confidence_floor: f32,
) -> Result<Vec<Candidate>, SeascanError> {
    let shape = output.shape();
    let expected_rows = CXYWH_OFFSET + labels.len();
    ensure!(
        shape[0] == BATCH_SIZE && shape[1] == expected_rows,
        ShapeContractSnafu {
            stage: "decode",
            expected: format!("[{}, {}, N]", BATCH_SIZE, expected_rows),
            actual: shape.to_vec(),
        }
    );

    // model space -> original pixels, per axis
    let input_size = input_size as f32;
    let factor = Vec2::new(
        original.width as f32 / input_size,
        original.height as f32 / input_size,
    );

    let output = output.index_axis_move(Axis(0), 0);
    let mut candidates = Vec::new();

    for prediction in output.axis_iter(Axis(1)) {
        let scores = prediction.slice(s![CXYWH_OFFSET..]);

        // First maximum wins on ties; NaN scores never win
        let (class_id, confidence) = scores.iter().enumerate().fold(
            (0, f32::NEG_INFINITY),
            |(best_idx, best), (idx, &score)| {
                if score > best {
                    (idx, score)
                } else {
                    (best_idx, best)
                }
            },
        );

        if !(confidence >= confidence_floor) {
            continue;
        }

        let center = Vec2::new(prediction[0_usize], prediction[1_usize]);
        let size = Vec2::new(prediction[2_usize], prediction[3_usize]);
        let bbox = Bbox::from_center_size(center, size).scale(factor);

        candidates.push(Candidate::new(
            bbox,
            class_id,
            labels.name(class_id),
            confidence,
        ));
    }

    debug!(
        proposals = output.len_of(Axis(1)),
        candidates = candidates.len(),
        confidence_floor,
        "decoded model output"
    );

    Ok(candidates)
}
