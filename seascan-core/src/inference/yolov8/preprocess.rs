use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use snafu::{ResultExt, ensure};

use crate::{
    consts::{BATCH_SIZE, INPUT_CHANNELS},
    error::*,
    inference::yolov8::{ResizeFilter, Yolov8Input},
};

/// Pixel dimensions of the image as uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Model input tensor plus the dimensions needed to map boxes back.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub tensor: Yolov8Input,
    pub original: ImageSize,
}

/// Decodes raw upload bytes into an image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, SeascanError> {
    let image = image::load_from_memory(bytes).context(DecodeSnafu)?;
    ensure!(image.width() > 0 && image.height() > 0, EmptyImageSnafu);

    Ok(image)
}

/// Decodes `bytes` and normalizes the result, see [`normalize_image`].
pub fn normalize(
    bytes: &[u8],
    input_size: u32,
    filter: ResizeFilter,
) -> Result<NormalizedImage, SeascanError> {
    let image = decode_image(bytes)?;
    normalize_image(&image, input_size, filter)
}

/// Resamples `image` to `input_size x input_size` RGB and lays it out as a
/// `[1, 3, S, S]` tensor scaled to `[0, 1]`.
///
/// The aspect ratio is not preserved; box coordinates are later rescaled
/// per axis with the returned original size.
pub fn normalize_image(
    image: &DynamicImage,
    input_size: u32,
    filter: ResizeFilter,
) -> Result<NormalizedImage, SeascanError> {
    let (width, height) = image.dimensions();
    ensure!(width > 0 && height > 0, EmptyImageSnafu);

    let resized = image
        .resize_exact(input_size, input_size, filter.into())
        .to_rgb8();

    let side = input_size as usize;
    let mut tensor = Array4::zeros([BATCH_SIZE, INPUT_CHANNELS, side, side]);

    for (x, y, pixel) in resized.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = pixel.0;
        tensor[[0, 0, y, x]] = r as f32 / 255.0;
        tensor[[0, 1, y, x]] = g as f32 / 255.0;
        tensor[[0, 2, y, x]] = b as f32 / 255.0;
    }

    Ok(NormalizedImage {
        tensor,
        original: ImageSize { width, height },
    })
}
