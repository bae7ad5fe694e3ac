pub mod container;
pub mod exif;
pub mod io;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::ExifKit;

pub use exif::{ExifData, LoadOptions};
pub use exif::{ByteOrder, ExifDateTime, ExifError, ExifIfd, ExifRational,
               ExifResult, GeoCoordinate, ImageFileBlock, ImageFormat,
               StrCoding, TagType};
pub use container::detect_format;
