//! Custom error types for EXIF processing

use std::fmt;
use std::io;

use crate::exif::types::ImageFormat;

/// EXIF-specific error types
#[derive(Debug)]
pub enum ExifError {
    /// I/O error
    IoError(io::Error),
    /// The first bytes of the stream match no supported image format
    ImageTypeNotSupported,
    /// The image uses a feature the codec cannot process
    UnsupportedFeature(&'static str),
    /// The container framing of the image is damaged
    ImageStructure(String),
    /// The container is fine but the embedded EXIF block is malformed
    IllegalExifBlock(String),
    /// The serialized EXIF block exceeds the format maximum
    ExifBlockTooLarge { size: u64, max: u64 },
    /// Saving into a different image format than was loaded
    ImageTypeMismatch {
        loaded: ImageFormat,
        found: ImageFormat,
    },
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for ExifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifError::IoError(e) => write!(f, "I/O error: {}", e),
            ExifError::ImageTypeNotSupported => write!(f, "Image type is not supported"),
            ExifError::UnsupportedFeature(what) => {
                write!(f, "Image has an unsupported feature: {}", what)
            }
            ExifError::ImageStructure(msg) => write!(f, "Internal image structure is wrong: {}", msg),
            ExifError::IllegalExifBlock(msg) => write!(f, "EXIF block has illegal content: {}", msg),
            ExifError::ExifBlockTooLarge { size, max } => {
                write!(f, "EXIF data too large: {} bytes, maximum is {}", size, max)
            }
            ExifError::ImageTypeMismatch { loaded, found } => {
                write!(f, "Image types do not match: loaded {}, found {}", loaded, found)
            }
            ExifError::GenericError(msg) => write!(f, "EXIF error: {}", msg),
        }
    }
}

impl std::error::Error for ExifError {}

impl From<io::Error> for ExifError {
    fn from(error: io::Error) -> Self {
        ExifError::IoError(error)
    }
}

impl From<String> for ExifError {
    fn from(msg: String) -> Self {
        ExifError::GenericError(msg)
    }
}

/// Result type for EXIF operations
pub type ExifResult<T> = Result<T, ExifError>;
