use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use little_exif::{
    exif_tag::ExifTag, filetype::FileExtension, metadata::Metadata, rational::uR64,
};
use ndarray::{Array3, Array4};

use crate::{
    error::SeascanError,
    inference::{model::Backend, yolov8::Yolov8},
};

/// Backend that replays a fixed raw output and records the input shapes.
pub(crate) struct FixedBackend {
    pub output: Array3<f32>,
    pub seen_shapes: Vec<Vec<usize>>,
}

impl FixedBackend {
    pub(crate) fn new(output: Array3<f32>) -> Self {
        Self {
            output,
            seen_shapes: Vec::new(),
        }
    }
}

impl Backend<Yolov8> for FixedBackend {
    fn infer(&mut self, input: Array4<f32>) -> Result<Array3<f32>, SeascanError> {
        self.seen_shapes.push(input.shape().to_vec());
        Ok(self.output.clone())
    }
}

/// One proposal scoring 0.9 for class 0, the rest under the floor. Every
/// proposal is a box of side S/4 centered in model space.
pub(crate) fn single_hit_output(input_size: f32, proposals: usize) -> Array3<f32> {
    let mut output = Array3::<f32>::zeros((1, 5, proposals));
    for n in 0..proposals {
        output[[0, 0, n]] = input_size / 2.0;
        output[[0, 1, n]] = input_size / 2.0;
        output[[0, 2, n]] = input_size / 4.0;
        output[[0, 3, n]] = input_size / 4.0;
        output[[0, 4, n]] = 0.05;
    }
    output[[0, 4, proposals / 2]] = 0.9;
    output
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::new_rgb8(width, height);
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

fn dms_values(parts: [(u32, u32); 3]) -> Vec<uR64> {
    parts
        .iter()
        .map(|&(nominator, denominator)| uR64 {
            nominator,
            denominator,
        })
        .collect()
}

/// JPEG carrying the four GPS position tags.
pub(crate) fn geotagged_jpeg_bytes(
    latitude_ref: &str,
    latitude: [(u32, u32); 3],
    longitude_ref: &str,
    longitude: [(u32, u32); 3],
) -> Vec<u8> {
    let image = DynamicImage::new_rgb8(8, 8);
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Jpeg)
        .expect("encode jpeg");
    let mut bytes = bytes.into_inner();

    let mut metadata = Metadata::new();
    metadata.set_tag(ExifTag::GPSLatitudeRef(latitude_ref.to_string()));
    metadata.set_tag(ExifTag::GPSLatitude(dms_values(latitude)));
    metadata.set_tag(ExifTag::GPSLongitudeRef(longitude_ref.to_string()));
    metadata.set_tag(ExifTag::GPSLongitude(dms_values(longitude)));
    metadata
        .write_to_vec(&mut bytes, FileExtension::JPEG)
        .expect("embed exif");
    bytes
}

/// 40°26'46"N 79°58'56"W
pub(crate) fn pittsburgh_jpeg_bytes() -> Vec<u8> {
    geotagged_jpeg_bytes(
        "N",
        [(40, 1), (26, 1), (46, 1)],
        "W",
        [(79, 1), (58, 1), (56, 1)],
    )
}
