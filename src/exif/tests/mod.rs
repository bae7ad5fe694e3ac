//! Tests for the EXIF block modules

mod test_utils;

mod values_tests;
mod tag_tests;
