//! Core EXIF data structures

use std::fmt;

use crate::exif::constants::{field_types, header};
use crate::exif::errors::{ExifError, ExifResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;

/// Image container formats the codec understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG, metadata carried in APPn segments
    Jpeg,
    /// TIFF, the whole file is the metadata block
    Tiff,
    /// PNG, metadata carried in chunks
    Png,
}

impl ImageFormat {
    /// Returns a string representation of this format
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Png => "PNG",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The five logical IFDs of an EXIF block
///
/// Every metadata object carries all five tables regardless of container
/// format; tables that do not occur in the file are simply empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExifIfd {
    /// Main image tags, root of the pointer graph
    PrimaryData = 0,
    /// EXIF private tags, reached through the ExifIfdPointer tag
    PrivateData = 1,
    /// GPS tags, reached through the GpsInfoIfdPointer tag
    GpsInfoData = 2,
    /// Interoperability tags, reached from Private Data
    Interoperability = 3,
    /// Thumbnail tags, reached through the Primary IFD's trailing offset
    ThumbnailData = 4,
}

impl ExifIfd {
    /// All IFDs in pointer-graph order
    pub const ALL: [ExifIfd; 5] = [
        ExifIfd::PrimaryData,
        ExifIfd::PrivateData,
        ExifIfd::GpsInfoData,
        ExifIfd::Interoperability,
        ExifIfd::ThumbnailData,
    ];

    /// Table index of this IFD within a metadata object
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns a string representation of this IFD
    pub fn name(&self) -> &'static str {
        match self {
            ExifIfd::PrimaryData => "Primary Data",
            ExifIfd::PrivateData => "Private Data",
            ExifIfd::GpsInfoData => "GPS Info",
            ExifIfd::Interoperability => "Interoperability",
            ExifIfd::ThumbnailData => "Thumbnail Data",
        }
    }
}

impl fmt::Display for ExifIfd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Field types a tag value can have, as TIFF defines them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    Byte = 1,
    Ascii = 2,
    UShort = 3,
    ULong = 4,
    URational = 5,
    SByte = 6,
    Undefined = 7,
    SShort = 8,
    SLong = 9,
    SRational = 10,
    Float = 11,
    Double = 12,
}

impl TagType {
    /// Maps a wire type code to a TagType, None for codes EXIF does
    /// not define
    pub fn from_u16(code: u16) -> Option<TagType> {
        match code {
            field_types::BYTE => Some(TagType::Byte),
            field_types::ASCII => Some(TagType::Ascii),
            field_types::USHORT => Some(TagType::UShort),
            field_types::ULONG => Some(TagType::ULong),
            field_types::URATIONAL => Some(TagType::URational),
            field_types::SBYTE => Some(TagType::SByte),
            field_types::UNDEFINED => Some(TagType::Undefined),
            field_types::SSHORT => Some(TagType::SShort),
            field_types::SLONG => Some(TagType::SLong),
            field_types::SRATIONAL => Some(TagType::SRational),
            field_types::FLOAT => Some(TagType::Float),
            field_types::DOUBLE => Some(TagType::Double),
            _ => None,
        }
    }

    /// Wire type code of this TagType
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Byte width of a single element of this type
    pub fn size(&self) -> u32 {
        field_types::SIZES[*self as usize]
    }

    /// Returns a string representation of this type
    pub fn name(&self) -> &'static str {
        match self {
            TagType::Byte => "BYTE",
            TagType::Ascii => "ASCII",
            TagType::UShort => "USHORT",
            TagType::ULong => "ULONG",
            TagType::URational => "URATIONAL",
            TagType::SByte => "SBYTE",
            TagType::Undefined => "UNDEFINED",
            TagType::SShort => "SSHORT",
            TagType::SLong => "SLONG",
            TagType::SRational => "SRATIONAL",
            TagType::Float => "FLOAT",
            TagType::Double => "DOUBLE",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Auxiliary metadata blocks tracked per image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFileBlock {
    /// The EXIF block itself
    Exif = 0,
    /// IPTC record (JPEG APP13, PNG iTXt, TIFF tag)
    Iptc = 1,
    /// XMP packet (JPEG APP1, PNG iTXt, TIFF tag)
    Xmp = 2,
    /// JPEG comment segment
    JpegComment = 3,
    /// PNG tEXt chunk
    PngMetaData = 4,
    /// PNG tIME chunk
    PngDateChanged = 5,
}

impl ImageFileBlock {
    /// All tracked block kinds
    pub const ALL: [ImageFileBlock; 6] = [
        ImageFileBlock::Exif,
        ImageFileBlock::Iptc,
        ImageFileBlock::Xmp,
        ImageFileBlock::JpegComment,
        ImageFileBlock::PngMetaData,
        ImageFileBlock::PngDateChanged,
    ];

    /// Status slot index of this block kind
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns a string representation of this block kind
    pub fn name(&self) -> &'static str {
        match self {
            ImageFileBlock::Exif => "EXIF",
            ImageFileBlock::Iptc => "IPTC",
            ImageFileBlock::Xmp => "XMP",
            ImageFileBlock::JpegComment => "JPEG comment",
            ImageFileBlock::PngMetaData => "PNG text",
            ImageFileBlock::PngDateChanged => "PNG date changed",
        }
    }
}

impl fmt::Display for ImageFileBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Presence of an auxiliary block within the loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// The source image does not carry this block
    NonExistent,
    /// The block was present but has been marked for removal on save
    Removed,
    /// The block is present and will be carried over on save
    Existent,
}

/// The fixed 8-byte TIFF header opening every EXIF block
#[derive(Debug, Clone, Copy)]
pub struct TiffHeader {
    /// Byte order of everything that follows
    pub byte_order: ByteOrder,
    /// Absolute offset of the Primary Data IFD
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Reads a header from a stream positioned at its first byte
    pub fn read(reader: &mut dyn SeekableReader) -> ExifResult<TiffHeader> {
        let byte_order = ByteOrder::detect(reader)?;
        let handler = byte_order.create_handler();
        let version = handler.read_u16(reader)?;
        if version != header::TIFF_VERSION {
            return Err(ExifError::IllegalExifBlock(format!(
                "unexpected TIFF version {}",
                version
            )));
        }
        let first_ifd_offset = handler.read_u32(reader)?;
        Ok(TiffHeader {
            byte_order,
            first_ifd_offset,
        })
    }

    /// Reads a header from the first 8 bytes of a resident block
    pub fn read_in(block: &[u8]) -> ExifResult<TiffHeader> {
        if block.len() < header::LENGTH {
            return Err(ExifError::IllegalExifBlock(
                "block too short for a TIFF header".to_string(),
            ));
        }
        let byte_order = ByteOrder::detect_in(block)?;
        let handler = byte_order.create_handler();
        let version = handler.get_u16(block, 2);
        if version != header::TIFF_VERSION {
            return Err(ExifError::IllegalExifBlock(format!(
                "unexpected TIFF version {}",
                version
            )));
        }
        Ok(TiffHeader {
            byte_order,
            first_ifd_offset: handler.get_u32(block, 4),
        })
    }

    /// Appends the 8 header bytes to a growing buffer
    pub fn write_into(out: &mut Vec<u8>, byte_order: ByteOrder, first_ifd_offset: u32) {
        let handler: Box<dyn ByteOrderHandler> = byte_order.create_handler();
        out.extend_from_slice(&byte_order.marker_bytes());
        handler.append_u16(out, header::TIFF_VERSION);
        handler.append_u32(out, first_ifd_offset);
    }
}
