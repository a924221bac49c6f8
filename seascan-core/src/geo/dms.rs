//! Sexagesimal GPS metadata to signed decimal degrees.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ensure};

use crate::error::*;

pub const LATITUDE_REF_TAG: &str = "GPSLatitudeRef";
pub const LATITUDE_TAG: &str = "GPSLatitude";
pub const LONGITUDE_REF_TAG: &str = "GPSLongitudeRef";
pub const LONGITUDE_TAG: &str = "GPSLongitude";

/// An unsigned EXIF rational, `numerator / denominator`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: u64,
    pub denominator: u64,
}

impl Rational {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub const fn integer(value: u64) -> Self {
        Self::new(value, 1)
    }

    pub fn to_f64(self) -> Result<f64, SeascanError> {
        ensure!(
            self.denominator != 0,
            InvalidRationalSnafu {
                value: format!("{}/{}", self.numerator, self.denominator),
            }
        );

        Ok(self.numerator as f64 / self.denominator as f64)
    }
}

/// Parses `"a/b"`, `"a"` or a plain decimal such as `"46.25"`.
impl FromStr for Rational {
    type Err = SeascanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || InvalidRationalSnafu { value: s }.build();

        if let Some((numerator, denominator)) = s.split_once('/') {
            let numerator = numerator.trim().parse().map_err(|_| invalid())?;
            let denominator = denominator.trim().parse().map_err(|_| invalid())?;
            return Ok(Self::new(numerator, denominator));
        }

        if let Ok(value) = s.parse::<u64>() {
            return Ok(Self::integer(value));
        }

        // Decimal form: keep the digits after the point as a power-of-ten denominator
        let (whole, fraction) = s.split_once('.').ok_or_else(invalid)?;
        ensure!(
            fraction.len() <= 9 && fraction.chars().all(|c| c.is_ascii_digit()),
            InvalidRationalSnafu { value: s }
        );
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let scale = 10u64.pow(fraction.len() as u32);
        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };

        let numerator = whole
            .checked_mul(scale)
            .and_then(|value| value.checked_add(fraction))
            .ok_or_else(invalid)?;

        Ok(Self::new(numerator, scale))
    }
}

/// Degrees, minutes and seconds as stored in GPS metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dms {
    pub degrees: Rational,
    pub minutes: Rational,
    pub seconds: Rational,
}

impl Dms {
    pub const fn new(degrees: Rational, minutes: Rational, seconds: Rational) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }

    /// Unsigned decimal degrees: `d + m / 60 + s / 3600`.
    pub fn to_decimal_degrees(&self) -> Result<f64, SeascanError> {
        let degrees = self.degrees.to_f64()?;
        let minutes = self.minutes.to_f64()?;
        let seconds = self.seconds.to_f64()?;

        Ok(degrees + minutes / 60.0 + seconds / 3600.0)
    }
}

/// Parses the textual dump form `"[40, 26, 2771/100]"`.
impl FromStr for Dms {
    type Err = SeascanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let parts = inner
            .split(',')
            .map(Rational::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [degrees, minutes, seconds] => Ok(Self::new(*degrees, *minutes, *seconds)),
            _ => InvalidRationalSnafu { value: s }.fail(),
        }
    }
}

impl TryFrom<&[Rational]> for Dms {
    type Error = SeascanError;

    fn try_from(parts: &[Rational]) -> Result<Self, Self::Error> {
        match parts {
            [degrees, minutes, seconds, ..] => Ok(Self::new(*degrees, *minutes, *seconds)),
            _ => InvalidRationalSnafu {
                value: format!("{:?}", parts),
            }
            .fail(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parses a one-letter reference, ignoring case and surrounding space.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "N" => Some(Hemisphere::North),
            "S" => Some(Hemisphere::South),
            "E" => Some(Hemisphere::East),
            "W" => Some(Hemisphere::West),
            _ => None,
        }
    }

    pub const fn is_latitude(&self) -> bool {
        matches!(self, Hemisphere::North | Hemisphere::South)
    }

    pub const fn sign(&self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }
}

/// Raw GPS tags as handed over by a metadata extractor. Any of them may be
/// absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GpsTags {
    pub latitude_ref: Option<String>,
    pub latitude: Option<Dms>,
    pub longitude_ref: Option<String>,
    pub longitude: Option<Dms>,
}

impl GpsTags {
    pub fn is_empty(&self) -> bool {
        self.latitude_ref.is_none()
            && self.latitude.is_none()
            && self.longitude_ref.is_none()
            && self.longitude.is_none()
    }
}

/// Signed decimal-degree position; south and west are negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Converts hemisphere references plus DMS values to a coordinate.
    pub fn from_dms(
        latitude_ref: &str,
        latitude: &Dms,
        longitude_ref: &str,
        longitude: &Dms,
    ) -> Result<Self, SeascanError> {
        let latitude_hemisphere = Hemisphere::parse(latitude_ref)
            .filter(Hemisphere::is_latitude)
            .context(InvalidHemisphereSnafu {
                tag: LATITUDE_REF_TAG,
                value: latitude_ref,
            })?;
        let longitude_hemisphere = Hemisphere::parse(longitude_ref)
            .filter(|hemisphere| !hemisphere.is_latitude())
            .context(InvalidHemisphereSnafu {
                tag: LONGITUDE_REF_TAG,
                value: longitude_ref,
            })?;

        let latitude = latitude.to_decimal_degrees()? * latitude_hemisphere.sign();
        let longitude = longitude.to_decimal_degrees()? * longitude_hemisphere.sign();

        ensure!(
            (-90.0..=90.0).contains(&latitude),
            CoordinateOutOfRangeSnafu {
                axis: "latitude",
                value: latitude,
            }
        );
        ensure!(
            (-180.0..=180.0).contains(&longitude),
            CoordinateOutOfRangeSnafu {
                axis: "longitude",
                value: longitude,
            }
        );

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Normalizes extracted GPS tags, failing with `GeolocationMissing` when any
/// of the four required tags is absent.
pub fn normalize(tags: &GpsTags) -> Result<GeoCoordinate, SeascanError> {
    let latitude_ref = tags.latitude_ref.as_deref().context(GeolocationMissingSnafu {
        tag: LATITUDE_REF_TAG,
    })?;
    let latitude = tags
        .latitude
        .as_ref()
        .context(GeolocationMissingSnafu { tag: LATITUDE_TAG })?;
    let longitude_ref = tags.longitude_ref.as_deref().context(GeolocationMissingSnafu {
        tag: LONGITUDE_REF_TAG,
    })?;
    let longitude = tags
        .longitude
        .as_ref()
        .context(GeolocationMissingSnafu { tag: LONGITUDE_TAG })?;

    GeoCoordinate::from_dms(latitude_ref, latitude, longitude_ref, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pittsburgh() -> GpsTags {
        GpsTags {
            latitude_ref: Some("N".to_string()),
            latitude: Some(Dms::new(
                Rational::integer(40),
                Rational::integer(26),
                Rational::new(46, 1),
            )),
            longitude_ref: Some("W".to_string()),
            longitude: Some(Dms::new(
                Rational::integer(79),
                Rational::integer(58),
                Rational::new(5600, 100),
            )),
        }
    }

    #[test]
    fn test_normalize_known_position() -> Result<(), Box<dyn std::error::Error>> {
        let coordinate = normalize(&pittsburgh())?;
        assert!((coordinate.latitude - 40.4461).abs() < 1e-3);
        assert!((coordinate.longitude - -79.9822).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn test_southern_and_eastern_signs() -> Result<(), Box<dyn std::error::Error>> {
        let dms = Dms::new(Rational::integer(33), Rational::integer(51), Rational::new(3, 1));
        let coordinate = GeoCoordinate::from_dms("s", &dms, " E ", &dms)?;
        assert!(coordinate.latitude < 0.0);
        assert!(coordinate.longitude > 0.0);
        assert!((coordinate.latitude + 33.850_833).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_missing_tag_is_reported() {
        let cases: [(fn(&mut GpsTags), &str); 4] = [
            (|tags| tags.latitude_ref = None, LATITUDE_REF_TAG),
            (|tags| tags.latitude = None, LATITUDE_TAG),
            (|tags| tags.longitude_ref = None, LONGITUDE_REF_TAG),
            (|tags| tags.longitude = None, LONGITUDE_TAG),
        ];

        for (strip, expected) in cases {
            let mut tags = pittsburgh();
            strip(&mut tags);
            match normalize(&tags) {
                Err(SeascanError::GeolocationMissing { tag }) => assert_eq!(tag, expected),
                other => panic!("expected missing `{}`, got {:?}", expected, other),
            }
        }

        assert!(matches!(
            normalize(&GpsTags::default()),
            Err(SeascanError::GeolocationMissing { .. })
        ));
    }

    #[test]
    fn test_invalid_hemisphere() {
        let dms = Dms::new(Rational::integer(1), Rational::integer(0), Rational::integer(0));
        assert!(matches!(
            GeoCoordinate::from_dms("E", &dms, "W", &dms),
            Err(SeascanError::InvalidHemisphere { .. })
        ));
        assert!(matches!(
            GeoCoordinate::from_dms("N", &dms, "S", &dms),
            Err(SeascanError::InvalidHemisphere { .. })
        ));
        assert!(matches!(
            GeoCoordinate::from_dms("", &dms, "E", &dms),
            Err(SeascanError::InvalidHemisphere { .. })
        ));
    }

    #[test]
    fn test_zero_denominator() {
        let dms = Dms::new(Rational::integer(10), Rational::new(5, 0), Rational::integer(0));
        assert!(matches!(
            dms.to_decimal_degrees(),
            Err(SeascanError::InvalidRational { .. })
        ));
    }

    #[test]
    fn test_out_of_range() {
        let dms = Dms::new(Rational::integer(95), Rational::integer(0), Rational::integer(0));
        let ok = Dms::new(Rational::integer(10), Rational::integer(0), Rational::integer(0));
        assert!(matches!(
            GeoCoordinate::from_dms("N", &dms, "E", &ok),
            Err(SeascanError::CoordinateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_rational() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!("2771/100".parse::<Rational>()?, Rational::new(2771, 100));
        assert_eq!(" 26 ".parse::<Rational>()?, Rational::integer(26));
        assert_eq!("46.25".parse::<Rational>()?, Rational::new(4625, 100));
        assert!("abc".parse::<Rational>().is_err());
        assert!("1/x".parse::<Rational>().is_err());
        Ok(())
    }

    #[test]
    fn test_parse_dms_dump() -> Result<(), Box<dyn std::error::Error>> {
        let dms: Dms = "[40, 26, 2771/100]".parse()?;
        assert_eq!(dms.degrees, Rational::integer(40));
        assert_eq!(dms.seconds, Rational::new(2771, 100));
        let degrees = dms.to_decimal_degrees()?;
        assert!((degrees - (40.0 + 26.0 / 60.0 + 27.71 / 3600.0)).abs() < 1e-9);

        assert!("[40, 26]".parse::<Dms>().is_err());
        Ok(())
    }
}
