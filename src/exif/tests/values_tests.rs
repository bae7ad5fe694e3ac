//! Tests for the value types module

extern crate std;

use crate::exif::values::{ExifDateTime, ExifRational, GeoCoordinate};

#[test]
fn test_rational_creation() {
    let rational = ExifRational::new(1, 3);
    std::assert_eq!(rational.numerator, 1);
    std::assert_eq!(rational.denominator, 3);
    std::assert!(!rational.negative);
    std::assert!(rational.is_valid());

    let invalid = ExifRational::new(1, 0);
    std::assert!(!invalid.is_valid());
    std::assert_eq!(invalid.to_decimal(), 0.0);
}

#[test]
fn test_rational_signed_creation() {
    let negative = ExifRational::new_signed(-1, 2);
    std::assert_eq!(negative.numerator, 1);
    std::assert_eq!(negative.denominator, 2);
    std::assert!(negative.negative);

    // A negative denominator moves the sign to the whole value
    let flipped = ExifRational::new_signed(3, -4);
    std::assert!(flipped.negative);
    std::assert_eq!(flipped.signed_parts(), (-3, 4));

    let double_negative = ExifRational::new_signed(-5, -6);
    std::assert!(!double_negative.negative);

    // Zero never carries a sign
    let zero = ExifRational::new_signed(0, -5);
    std::assert!(!zero.negative);
}

#[test]
fn test_rational_to_decimal() {
    std::assert_eq!(ExifRational::new(1, 2).to_decimal(), 0.5);
    std::assert_eq!(ExifRational::new_signed(-3, 4).to_decimal(), -0.75);
}

#[test]
fn test_rational_from_decimal() {
    let half = ExifRational::from_decimal(0.5);
    std::assert_eq!(half.numerator, 5);
    std::assert_eq!(half.denominator, 10);
    std::assert_eq!(half.to_decimal(), 0.5);

    let whole = ExifRational::from_decimal(12.0);
    std::assert_eq!(whole.numerator, 12);
    std::assert_eq!(whole.denominator, 1);

    let negative = ExifRational::from_decimal(-0.25);
    std::assert!(negative.negative);
    std::assert_eq!(negative.to_decimal(), -0.25);

    let zero = ExifRational::from_decimal(0.0);
    std::assert_eq!(zero.numerator, 0);
    std::assert_eq!(zero.denominator, 1);
    std::assert!(!zero.negative);
}

#[test]
fn test_rational_from_decimal_limits() {
    // Magnitudes beyond the format saturate
    let huge = ExifRational::from_decimal(2e9);
    std::assert_eq!(huge.numerator, 999_999_999);
    std::assert_eq!(huge.denominator, 1);

    let negative_huge = ExifRational::from_decimal(-2e9);
    std::assert!(negative_huge.negative);

    // Non-finite input yields an invalid rational
    std::assert!(!ExifRational::from_decimal(f64::NAN).is_valid());
    std::assert!(!ExifRational::from_decimal(f64::INFINITY).is_valid());
}

#[test]
fn test_rational_display() {
    std::assert_eq!(ExifRational::new(1, 3).to_string(), "1/3");
    std::assert_eq!(ExifRational::new_signed(-1, 2).to_string(), "-1/2");
}

#[test]
fn test_date_time_formatting() {
    let date = ExifDateTime::new(2023, 4, 5, 6, 7, 8);
    std::assert_eq!(date.format_date_time(), "2023:04:05 06:07:08");
    std::assert_eq!(date.format_date(), "2023:04:05");
    std::assert_eq!(date.to_string(), "2023:04:05 06:07:08");

    let mut with_millis = date;
    with_millis.millisecond = 70;
    std::assert_eq!(with_millis.to_string(), "2023:04:05 06:07:08.070");
}

#[test]
fn test_date_time_parsing() {
    let parsed = ExifDateTime::parse_date_time("2023:04:05 06:07:08").unwrap();
    std::assert_eq!(parsed, ExifDateTime::new(2023, 4, 5, 6, 7, 8));
    std::assert_eq!(parsed.millisecond, 0);

    let date_only = ExifDateTime::parse_date("2023:04:05").unwrap();
    std::assert_eq!(date_only, ExifDateTime::new_date(2023, 4, 5));
}

#[test]
fn test_date_time_parsing_rejects_bad_input() {
    // Wrong separators
    std::assert!(ExifDateTime::parse_date_time("2023-04-05 06:07:08").is_none());
    // Wrong length
    std::assert!(ExifDateTime::parse_date_time("2023:04:05 06:07:8").is_none());
    // Out-of-range fields
    std::assert!(ExifDateTime::parse_date_time("2023:13:05 06:07:08").is_none());
    std::assert!(ExifDateTime::parse_date_time("2023:04:32 06:07:08").is_none());
    std::assert!(ExifDateTime::parse_date_time("2023:04:05 24:07:08").is_none());
    std::assert!(ExifDateTime::parse_date_time("2023:04:05 06:60:08").is_none());
    // Non-digit characters
    std::assert!(ExifDateTime::parse_date_time("20a3:04:05 06:07:08").is_none());
    std::assert!(ExifDateTime::parse_date("2023:4:05").is_none());
}

#[test]
fn test_geo_coordinate_from_decimal() {
    let latitude = GeoCoordinate::from_decimal(51.5, true);
    std::assert_eq!(latitude.cardinal, 'N');
    std::assert_eq!(latitude.degrees, 51.0);
    std::assert_eq!(latitude.minutes, 30.0);
    std::assert!(latitude.seconds.abs() < 1e-9);

    let longitude = GeoCoordinate::from_decimal(-0.5, false);
    std::assert_eq!(longitude.cardinal, 'W');
    std::assert_eq!(longitude.degrees, 0.0);
    std::assert_eq!(longitude.minutes, 30.0);

    let south = GeoCoordinate::from_decimal(-33.75, true);
    std::assert_eq!(south.cardinal, 'S');
}

#[test]
fn test_geo_coordinate_to_decimal() {
    let north = GeoCoordinate {
        degrees: 51.0,
        minutes: 30.0,
        seconds: 0.0,
        cardinal: 'N',
    };
    std::assert_eq!(north.to_decimal(), 51.5);

    let west = GeoCoordinate {
        degrees: 0.0,
        minutes: 7.0,
        seconds: 30.0,
        cardinal: 'W',
    };
    std::assert!((west.to_decimal() - (-0.125)).abs() < 1e-9);
}

#[test]
fn test_geo_coordinate_round_trip() {
    let original = 48.858222;
    let coordinate = GeoCoordinate::from_decimal(original, true);
    std::assert!((coordinate.to_decimal() - original).abs() < 1e-9);
}

#[test]
fn test_geo_coordinate_display() {
    let coordinate = GeoCoordinate {
        degrees: 51.0,
        minutes: 30.0,
        seconds: 0.0,
        cardinal: 'N',
    };
    std::assert_eq!(coordinate.to_string(), "51° 30' 0.00\" N");
}
