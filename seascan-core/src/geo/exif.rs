use image::ImageFormat;
use little_exif::{
    exif_tag::ExifTag, filetype::FileExtension, metadata::Metadata, rational::uR64,
};
use tracing::*;

use crate::geo::dms::{Dms, GpsTags, Rational};

/// Container formats whose EXIF block `little_exif` can read.
fn file_extension(bytes: &[u8]) -> Option<FileExtension> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some(FileExtension::JPEG),
        ImageFormat::Tiff => Some(FileExtension::TIFF),
        ImageFormat::WebP => Some(FileExtension::WEBP),
        ImageFormat::Png => Some(FileExtension::PNG {
            as_zTXt_chunk: false,
        }),
        _ => None,
    }
}

fn to_dms(values: &[uR64]) -> Option<Dms> {
    let parts = values
        .iter()
        .map(|value| Rational::new(value.nominator as u64, value.denominator as u64))
        .collect::<Vec<_>>();

    Dms::try_from(parts.as_slice()).ok()
}

/// Reads the four GPS position tags from raw image bytes.
///
/// Unsupported containers and images without an EXIF block give empty tags;
/// deciding whether that is an error is left to [`crate::geo::dms::normalize`].
pub fn read_gps_tags(bytes: &[u8]) -> GpsTags {
    let Some(file_type) = file_extension(bytes) else {
        debug!("no exif-capable container detected");
        return GpsTags::default();
    };

    let metadata = match Metadata::new_from_vec(&bytes.to_vec(), file_type) {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!("no exif metadata: {}", err);
            return GpsTags::default();
        }
    };

    let latitude_ref = metadata
        .get_tag(&ExifTag::GPSLatitudeRef(String::new()))
        .find_map(|tag| match tag {
            ExifTag::GPSLatitudeRef(value) => Some(value.trim_end_matches('\0').to_string()),
            _ => None,
        });
    let latitude = metadata
        .get_tag(&ExifTag::GPSLatitude(Vec::new()))
        .find_map(|tag| match tag {
            ExifTag::GPSLatitude(values) => to_dms(values),
            _ => None,
        });
    let longitude_ref = metadata
        .get_tag(&ExifTag::GPSLongitudeRef(String::new()))
        .find_map(|tag| match tag {
            ExifTag::GPSLongitudeRef(value) => Some(value.trim_end_matches('\0').to_string()),
            _ => None,
        });
    let longitude = metadata
        .get_tag(&ExifTag::GPSLongitude(Vec::new()))
        .find_map(|tag| match tag {
            ExifTag::GPSLongitude(values) => to_dms(values),
            _ => None,
        });

    GpsTags {
        latitude_ref,
        latitude,
        longitude_ref,
        longitude,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{
        error::SeascanError,
        geo::dms::normalize,
        inference::yolov8::testing::{geotagged_jpeg_bytes, pittsburgh_jpeg_bytes},
    };

    #[test]
    fn test_unknown_bytes_have_no_tags() {
        let tags = read_gps_tags(b"definitely not an image");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_png_without_exif() -> Result<(), Box<dyn std::error::Error>> {
        let image = image::DynamicImage::new_rgb8(8, 8);
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png)?;

        let tags = read_gps_tags(bytes.get_ref());
        assert!(tags.is_empty());
        assert!(matches!(
            normalize(&tags),
            Err(SeascanError::GeolocationMissing { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_jpeg_gps_tags() -> Result<(), Box<dyn std::error::Error>> {
        let tags = read_gps_tags(&pittsburgh_jpeg_bytes());

        assert_eq!(tags.latitude_ref.as_deref(), Some("N"));
        assert_eq!(tags.longitude_ref.as_deref(), Some("W"));
        assert_eq!(
            tags.latitude,
            Some(Dms::new(
                Rational::integer(40),
                Rational::integer(26),
                Rational::integer(46)
            ))
        );
        assert_eq!(
            tags.longitude,
            Some(Dms::new(
                Rational::integer(79),
                Rational::integer(58),
                Rational::integer(56)
            ))
        );

        let coordinate = normalize(&tags)?;
        assert!((coordinate.latitude - 40.4461).abs() < 1e-4);
        assert!((coordinate.longitude + 79.9822).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_jpeg_unset_gps_value() {
        let bytes = geotagged_jpeg_bytes(
            "S",
            [(0, 0), (0, 0), (0, 0)],
            "E",
            [(10, 1), (0, 1), (0, 1)],
        );
        let tags = read_gps_tags(&bytes);

        assert_eq!(tags.latitude_ref.as_deref(), Some("S"));
        assert!(matches!(
            normalize(&tags),
            Err(SeascanError::InvalidRational { .. })
        ));
    }

    #[test]
    fn test_to_dms() {
        let values = [
            uR64 {
                nominator: 40,
                denominator: 1,
            },
            uR64 {
                nominator: 26,
                denominator: 1,
            },
            uR64 {
                nominator: 4600,
                denominator: 100,
            },
        ];
        let dms = to_dms(&values);
        assert_eq!(
            dms,
            Some(Dms::new(
                Rational::integer(40),
                Rational::integer(26),
                Rational::new(4600, 100)
            ))
        );
        assert_eq!(to_dms(&values[..2]), None);
    }
}
