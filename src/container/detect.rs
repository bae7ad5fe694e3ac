//! Image format detection from the leading file signature

use std::io::{ErrorKind, SeekFrom};

use log::debug;

use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::types::ImageFormat;
use crate::io::seekable::SeekableReader;

/// Identifies the container format from the first four bytes
///
/// The reader may be at any position; it is rewound first and left
/// right after the signature bytes.
pub fn detect_format(reader: &mut dyn SeekableReader) -> ExifResult<ImageFormat> {
    reader.seek(SeekFrom::Start(0))?;
    let mut signature = [0u8; 4];
    if let Err(error) = reader.read_exact(&mut signature) {
        // a stream shorter than the signature is no known image
        if error.kind() == ErrorKind::UnexpectedEof {
            return Err(ExifError::ImageTypeNotSupported);
        }
        return Err(ExifError::IoError(error));
    }

    let format = match signature {
        [0xFF, 0xD8, 0xFF, _] => ImageFormat::Jpeg,
        [0x49, 0x49, 0x2A, 0x00] => ImageFormat::Tiff,
        [0x4D, 0x4D, 0x00, 0x2A] => ImageFormat::Tiff,
        [0x89, 0x50, 0x4E, 0x47] => ImageFormat::Png,
        _ => {
            debug!("Unrecognized file signature: {:02X?}", signature);
            return Err(ExifError::ImageTypeNotSupported);
        }
    };
    Ok(format)
}
