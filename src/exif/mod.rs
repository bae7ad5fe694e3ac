//! EXIF block parsing and serialization
//!
//! This module provides the metadata object, the tag tables it is made
//! of, and the reader/writer pair that maps them onto the TIFF-shaped
//! byte layout embedded in JPEG, TIFF and PNG files.

pub mod constants;
pub mod data;
pub mod errors;
pub mod reader;
pub mod strings;
pub mod tag;
pub mod types;
pub(crate) mod validation;
pub mod values;
pub mod writer;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
pub use data::{ExifData, LoadOptions};
pub use errors::{ExifError, ExifResult};
pub use strings::{CodePage, StrCoding, StrCodingFormat};
pub use tag::{IfdTable, TagItem};
pub use types::{BlockStatus, ExifIfd, ImageFileBlock, ImageFormat, TagType};
pub use values::{ExifDateTime, ExifRational, GeoCoordinate};
