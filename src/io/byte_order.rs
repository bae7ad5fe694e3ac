//! Byte order handling for TIFF-shaped metadata blocks
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading and writing
//! EXIF data. Handlers work against live streams for true TIFF files
//! and against resident byte buffers for blocks embedded in JPEG/PNG.

use byteorder::{BigEndian, ByteOrder as ByteOrderExt, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::exif::errors::{ExifError, ExifResult};
use crate::io::seekable::SeekableReader;

/// Represents the byte order of an EXIF block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the two-byte marker at the start
    /// of a TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> ExifResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        Self::from_marker(marker)
    }

    /// Detects the byte order from the first two bytes of a resident block
    pub fn detect_in(block: &[u8]) -> ExifResult<Self> {
        if block.len() < 2 {
            return Err(ExifError::IllegalExifBlock(
                "block too short for a byte order marker".to_string(),
            ));
        }
        Self::from_marker(LittleEndian::read_u16(&block[0..2]))
    }

    fn from_marker(marker: u16) -> ExifResult<Self> {
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(ExifError::IllegalExifBlock(format!(
                "invalid byte order marker 0x{:04X}",
                marker
            ))),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Returns the two marker bytes that open a TIFF header
    pub fn marker_bytes(&self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => [0x49, 0x49],
            ByteOrder::BigEndian => [0x4D, 0x4D],
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
///
/// Stream methods serve the TIFF load path, slice methods serve resident
/// blocks and tag value buffers, append methods serve the serializer.
/// Slice positions are validated by callers before use.
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value from a stream
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value from a stream
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Decode a u16 at a position in a buffer
    fn get_u16(&self, buf: &[u8], at: usize) -> u16;

    /// Decode a u32 at a position in a buffer
    fn get_u32(&self, buf: &[u8], at: usize) -> u32;

    /// Decode an f32 at a position in a buffer
    fn get_f32(&self, buf: &[u8], at: usize) -> f32;

    /// Decode an f64 at a position in a buffer
    fn get_f64(&self, buf: &[u8], at: usize) -> f64;

    /// Encode a u16 at a position in a buffer
    fn put_u16(&self, buf: &mut [u8], at: usize, value: u16);

    /// Encode a u32 at a position in a buffer
    fn put_u32(&self, buf: &mut [u8], at: usize, value: u32);

    /// Encode an f32 at a position in a buffer
    fn put_f32(&self, buf: &mut [u8], at: usize, value: f32);

    /// Encode an f64 at a position in a buffer
    fn put_f64(&self, buf: &mut [u8], at: usize, value: f64);

    /// Append a u16 to a growing buffer
    fn append_u16(&self, out: &mut Vec<u8>, value: u16);

    /// Append a u32 to a growing buffer
    fn append_u32(&self, out: &mut Vec<u8>, value: u32);
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn get_u16(&self, buf: &[u8], at: usize) -> u16 {
        LittleEndian::read_u16(&buf[at..at + 2])
    }

    fn get_u32(&self, buf: &[u8], at: usize) -> u32 {
        LittleEndian::read_u32(&buf[at..at + 4])
    }

    fn get_f32(&self, buf: &[u8], at: usize) -> f32 {
        LittleEndian::read_f32(&buf[at..at + 4])
    }

    fn get_f64(&self, buf: &[u8], at: usize) -> f64 {
        LittleEndian::read_f64(&buf[at..at + 8])
    }

    fn put_u16(&self, buf: &mut [u8], at: usize, value: u16) {
        LittleEndian::write_u16(&mut buf[at..at + 2], value);
    }

    fn put_u32(&self, buf: &mut [u8], at: usize, value: u32) {
        LittleEndian::write_u32(&mut buf[at..at + 4], value);
    }

    fn put_f32(&self, buf: &mut [u8], at: usize, value: f32) {
        LittleEndian::write_f32(&mut buf[at..at + 4], value);
    }

    fn put_f64(&self, buf: &mut [u8], at: usize, value: f64) {
        LittleEndian::write_f64(&mut buf[at..at + 8], value);
    }

    fn append_u16(&self, out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_le_bytes());
    }

    fn append_u32(&self, out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn get_u16(&self, buf: &[u8], at: usize) -> u16 {
        BigEndian::read_u16(&buf[at..at + 2])
    }

    fn get_u32(&self, buf: &[u8], at: usize) -> u32 {
        BigEndian::read_u32(&buf[at..at + 4])
    }

    fn get_f32(&self, buf: &[u8], at: usize) -> f32 {
        BigEndian::read_f32(&buf[at..at + 4])
    }

    fn get_f64(&self, buf: &[u8], at: usize) -> f64 {
        BigEndian::read_f64(&buf[at..at + 8])
    }

    fn put_u16(&self, buf: &mut [u8], at: usize, value: u16) {
        BigEndian::write_u16(&mut buf[at..at + 2], value);
    }

    fn put_u32(&self, buf: &mut [u8], at: usize, value: u32) {
        BigEndian::write_u32(&mut buf[at..at + 4], value);
    }

    fn put_f32(&self, buf: &mut [u8], at: usize, value: f32) {
        BigEndian::write_f32(&mut buf[at..at + 4], value);
    }

    fn put_f64(&self, buf: &mut [u8], at: usize, value: f64) {
        BigEndian::write_f64(&mut buf[at..at + 8], value);
    }

    fn append_u16(&self, out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    fn append_u32(&self, out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_be_bytes());
    }
}
