//! Value types for EXIF tag content
//!
//! Rational numbers, date/time stamps and GPS coordinates as they appear
//! in tag values, with conversions to and from the decimal forms callers
//! actually want to work with.

use std::fmt;

/// A rational tag value: numerator, denominator and a sign flag
///
/// One representation covers both URATIONAL and SRATIONAL wire values.
/// A rational is valid only if its denominator is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExifRational {
    pub numerator: u32,
    pub denominator: u32,
    pub negative: bool,
}

impl ExifRational {
    /// Creates a positive rational
    pub fn new(numerator: u32, denominator: u32) -> Self {
        ExifRational {
            numerator,
            denominator,
            negative: false,
        }
    }

    /// Creates a rational from signed parts, normalizing the sign
    pub fn new_signed(numerator: i32, denominator: i32) -> Self {
        ExifRational {
            numerator: numerator.unsigned_abs(),
            denominator: denominator.unsigned_abs(),
            negative: (numerator < 0) != (denominator < 0) && numerator != 0,
        }
    }

    /// True if the denominator is non-zero
    pub fn is_valid(&self) -> bool {
        self.denominator != 0
    }

    /// Numerator/denominator as signed values, numerator carrying the sign
    pub fn signed_parts(&self) -> (i32, i32) {
        let numerator = self.numerator.min(i32::MAX as u32) as i32;
        (
            if self.negative { -numerator } else { numerator },
            self.denominator.min(i32::MAX as u32) as i32,
        )
    }

    /// Converts to a decimal number, 0.0 if the rational is invalid
    pub fn to_decimal(&self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        let value = self.numerator as f64 / self.denominator as f64;
        if self.negative {
            -value
        } else {
            value
        }
    }

    /// Converts a decimal number to a rational
    ///
    /// Searches for the smallest power-of-ten denominator (up to 10^8)
    /// that represents the value with a numerator below 10^9, then strips
    /// common factors of ten. Magnitudes the format cannot hold saturate
    /// at 999999999/1; non-finite input yields an invalid rational.
    pub fn from_decimal(value: f64) -> Self {
        if !value.is_finite() {
            return ExifRational {
                numerator: 0,
                denominator: 0,
                negative: false,
            };
        }
        let negative = value < 0.0;
        let v = value.abs();
        if v >= 999_999_999.5 {
            return ExifRational {
                numerator: 999_999_999,
                denominator: 1,
                negative,
            };
        }

        let mut numerator: u64;
        let mut denominator: u64 = 1;
        loop {
            let scaled = v * denominator as f64;
            numerator = scaled.round() as u64;
            let exact = (scaled - scaled.round()).abs() <= scaled.max(1.0) * 1e-10;
            if exact || denominator >= 100_000_000 || scaled * 10.0 >= 999_999_999.5 {
                break;
            }
            denominator *= 10;
        }
        while numerator % 10 == 0 && denominator % 10 == 0 && denominator >= 10 {
            numerator /= 10;
            denominator /= 10;
        }

        ExifRational {
            numerator: numerator as u32,
            denominator: denominator as u32,
            negative: negative && numerator != 0,
        }
    }
}

impl fmt::Display for ExifRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}/{}", self.numerator, self.denominator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// A date/time stamp as stored in EXIF string tags
///
/// The wire format is the fixed-width ASCII string "yyyy:MM:dd HH:mm:ss"
/// (or "yyyy:MM:dd" for date-only tags). Milliseconds come from a
/// companion sub-second tag and are not part of the main string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExifDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl ExifDateTime {
    /// Creates a timestamp with a time-of-day
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        ExifDateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond: 0,
        }
    }

    /// Creates a date-only timestamp
    pub fn new_date(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Formats as "yyyy:MM:dd HH:mm:ss"
    pub fn format_date_time(&self) -> String {
        format!(
            "{:04}:{:02}:{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// Formats as "yyyy:MM:dd"
    pub fn format_date(&self) -> String {
        format!("{:04}:{:02}:{:02}", self.year, self.month, self.day)
    }

    /// Parses a 19-character "yyyy:MM:dd HH:mm:ss" string
    ///
    /// Digits are extracted positionally, there is no general date parsing.
    /// Wrong length, wrong separators or out-of-range fields yield None.
    pub fn parse_date_time(text: &str) -> Option<Self> {
        let b = text.as_bytes();
        if b.len() != 19 || b[10] != b' ' || b[13] != b':' || b[16] != b':' {
            return None;
        }
        let date = Self::parse_date(&text[..10])?;
        let hour = two_digits(b, 11)?;
        let minute = two_digits(b, 14)?;
        let second = two_digits(b, 17)?;
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(ExifDateTime {
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            ..date
        })
    }

    /// Parses a 10-character "yyyy:MM:dd" string
    pub fn parse_date(text: &str) -> Option<Self> {
        let b = text.as_bytes();
        if b.len() != 10 || b[4] != b':' || b[7] != b':' {
            return None;
        }
        let year = two_digits(b, 0)? * 100 + two_digits(b, 2)?;
        let month = two_digits(b, 5)?;
        let day = two_digits(b, 8)?;
        if month < 1 || month > 12 || day < 1 || day > 31 {
            return None;
        }
        Some(ExifDateTime::new_date(year, month as u8, day as u8))
    }
}

impl fmt::Display for ExifDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_date_time())?;
        if self.millisecond != 0 {
            write!(f, ".{:03}", self.millisecond)?;
        }
        Ok(())
    }
}

fn two_digits(bytes: &[u8], at: usize) -> Option<u16> {
    let hi = bytes[at];
    let lo = bytes[at + 1];
    if !hi.is_ascii_digit() || !lo.is_ascii_digit() {
        return None;
    }
    Some((hi - b'0') as u16 * 10 + (lo - b'0') as u16)
}

/// A GPS coordinate in the sexagesimal form EXIF stores
///
/// Degrees, minutes and seconds live in a three-element rational tag,
/// the cardinal point in a one-character reference tag next to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
    /// 'N' or 'S' for latitudes, 'E' or 'W' for longitudes
    pub cardinal: char,
}

impl GeoCoordinate {
    /// Splits a signed decimal degree value into coordinate parts
    pub fn from_decimal(value: f64, is_latitude: bool) -> Self {
        let cardinal = match (is_latitude, value < 0.0) {
            (true, false) => 'N',
            (true, true) => 'S',
            (false, false) => 'E',
            (false, true) => 'W',
        };
        let v = value.abs();
        let degrees = v.trunc();
        let rest = (v - degrees) * 60.0;
        let minutes = rest.trunc();
        let seconds = (rest - minutes) * 60.0;
        GeoCoordinate {
            degrees,
            minutes,
            seconds,
            cardinal,
        }
    }

    /// Collapses to a signed decimal degree value
    pub fn to_decimal(&self) -> f64 {
        let value = self.degrees + self.minutes / 60.0 + self.seconds / 3600.0;
        if self.cardinal == 'S' || self.cardinal == 'W' {
            -value
        } else {
            value
        }
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}° {}' {:.2}\" {}",
            self.degrees, self.minutes, self.seconds, self.cardinal
        )
    }
}
