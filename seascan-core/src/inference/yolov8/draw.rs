use std::path::Path;

use glam::Vec2;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use snafu::ResultExt;

use crate::{detection::element::DetectionSet, error::*};

const PALETTE: [[u8; 3]; 6] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
];

const LINE_WIDTH: i32 = 3;

/// Copy of `image` with each detection outlined, colored by class.
pub fn draw_detections(image: &DynamicImage, detections: &DetectionSet) -> RgbImage {
    let mut output_img = image.to_rgb8();
    let bounds = Vec2::new(output_img.width() as f32, output_img.height() as f32);

    for detection in detections {
        let bbox = detection.bbox;
        if !bbox.min.is_finite() || !bbox.max.is_finite() {
            continue;
        }

        // Outline only what lands on the image
        let min = bbox.min.clamp(Vec2::ZERO, bounds);
        let max = bbox.max.clamp(Vec2::ZERO, bounds);
        let x = min.x.round() as i32;
        let y = min.y.round() as i32;
        let width = (max.x - min.x).round() as u32;
        let height = (max.y - min.y).round() as u32;

        if width == 0 || height == 0 {
            continue;
        }

        let color = Rgb(PALETTE[detection.class_id % PALETTE.len()]);

        // Nested rectangles for a thicker outline
        for offset in 0..LINE_WIDTH {
            let thick_rect = Rect::at(x - offset, y - offset)
                .of_size(width + (offset * 2) as u32, height + (offset * 2) as u32);
            draw_hollow_rect_mut(&mut output_img, thick_rect, color);
        }
    }

    output_img
}

/// Draws `detections` on `image` and saves the result to `output`, creating
/// the parent directory when needed.
pub fn save_annotated<P: AsRef<Path>>(
    image: &DynamicImage,
    detections: &DetectionSet,
    output: P,
) -> Result<(), SeascanError> {
    let output = output.as_ref();
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context(IoWriteSnafu {
            path: parent.to_string_lossy(),
        })?;
    }

    draw_detections(image, detections)
        .save(output)
        .context(ImageWriteSnafu {
            path: output.to_string_lossy(),
        })
}
