//! EXIF validation utilities
//!
//! This module provides validation functions used while walking image
//! streams and EXIF blocks, to ensure data integrity and prevent errors
//! when processing potentially malformed files.

use std::io::SeekFrom;

use crate::exif::constants::limits;
use crate::exif::errors::{ExifError, ExifResult};
use crate::io::seekable::SeekableReader;

/// Measures the stream length, restoring the current position
///
/// # Arguments
/// * `reader` - The seekable reader to measure
///
/// # Returns
/// The stream length in bytes
pub fn stream_len(reader: &mut dyn SeekableReader) -> ExifResult<u64> {
    let current_position = reader.seek(SeekFrom::Current(0))?;
    let length = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(current_position))?;
    Ok(length)
}

/// Checks the stream against the largest size the codec supports
///
/// Offsets inside the formats are 32-bit, so anything past 2^31 - 1
/// bytes cannot be addressed reliably.
pub fn check_stream_size(length: u64) -> ExifResult<()> {
    if length > limits::MAX_STREAM_SIZE {
        return Err(ExifError::UnsupportedFeature("stream larger than 2 GiB"));
    }
    Ok(())
}

/// Validates an IFD offset against the bounds of its block or file
///
/// # Arguments
/// * `offset` - The offset to validate
/// * `total_size` - Size of the containing block or file
///
/// # Returns
/// Ok if the offset is usable, an error otherwise
pub fn validate_ifd_offset(offset: u64, total_size: u64) -> ExifResult<()> {
    // An IFD needs at least its entry count and next pointer, and can
    // never sit inside the 8-byte header
    if offset < 8 || offset + limits::EMPTY_IFD_SIZE as u64 > total_size {
        return Err(ExifError::IllegalExifBlock(format!(
            "invalid IFD offset {} (size {})",
            offset, total_size
        )));
    }
    Ok(())
}
