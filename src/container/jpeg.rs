//! JPEG segment scanning and rebuilding
//!
//! A JPEG file is a sequence of marker segments up to Start-Of-Scan,
//! after which the entropy coded image data runs to the end of the
//! file. The EXIF block travels in an APP1 segment behind an "Exif"
//! signature; XMP shares APP1 with its own signature, IPTC rides in
//! APP13 and plain comments in COM.

use std::io::{self, ErrorKind, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::exif::constants::{header, jpeg};
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::types::{BlockStatus, ImageFileBlock};
use crate::io::seekable::{SeekableReader, SeekableWriter};

/// What a scan of the segment list found
pub struct JpegScan {
    /// The TIFF-shaped EXIF block with the segment signature stripped
    pub exif_block: Option<Vec<u8>>,
    pub block_status: [BlockStatus; 6],
}

/// One parsed entry of the segment list
enum Segment {
    /// A bare marker with no length field
    Standalone(u16),
    /// A marker with its payload, the length field already consumed
    Tagged { marker: u16, payload: Vec<u8> },
    /// Start-Of-Scan; everything after it is opaque image data
    ScanStart,
}

/// Collects the EXIF block and the auxiliary block presence flags
pub fn scan(reader: &mut dyn SeekableReader) -> ExifResult<JpegScan> {
    reader.seek(SeekFrom::Start(0))?;
    expect_soi(reader)?;

    let mut exif_block = None;
    let mut block_status = [BlockStatus::NonExistent; 6];
    loop {
        match read_segment(reader)? {
            Segment::ScanStart => break,
            Segment::Standalone(_) => continue,
            Segment::Tagged { marker, payload } => match classify(marker, &payload) {
                Some(ImageFileBlock::Exif) => {
                    block_status[ImageFileBlock::Exif.index()] = BlockStatus::Existent;
                    // only the first EXIF segment counts
                    if exif_block.is_none() {
                        let block = payload[jpeg::EXIF_SIGNATURE.len()..].to_vec();
                        debug!("Found EXIF segment with {} block bytes", block.len());
                        exif_block = Some(block);
                    }
                }
                Some(kind) => block_status[kind.index()] = BlockStatus::Existent,
                None => continue,
            },
        }
    }
    Ok(JpegScan {
        exif_block,
        block_status,
    })
}

/// Rewrites the image with a fresh EXIF segment
///
/// The APP0 segments keep their leading place, the new EXIF APP1 comes
/// right after them, then every other segment of the source follows in
/// order except replaced and removed blocks. From Start-Of-Scan on the
/// source is copied through untouched.
pub fn save(
    source: &mut dyn SeekableReader,
    dest: &mut dyn SeekableWriter,
    block: Option<&[u8]>,
    block_status: &[BlockStatus; 6],
) -> ExifResult<()> {
    if let Some(block) = block {
        let tree_size = block.len().saturating_sub(header::LENGTH);
        if tree_size > jpeg::MAX_EXIF_TREE_SIZE {
            return Err(ExifError::ExifBlockTooLarge {
                size: tree_size as u64,
                max: jpeg::MAX_EXIF_TREE_SIZE as u64,
            });
        }
    }

    source.seek(SeekFrom::Start(0))?;
    expect_soi(source)?;
    dest.write_u16::<BigEndian>(jpeg::SOI)?;

    // leading pass: only the APP0 segments
    loop {
        match read_segment(source)? {
            Segment::ScanStart => break,
            Segment::Standalone(_) => continue,
            Segment::Tagged { marker, payload } => {
                if marker == jpeg::APP0 {
                    write_segment(dest, marker, &payload)?;
                }
            }
        }
    }

    if let Some(block) = block {
        let length = 2 + jpeg::EXIF_SIGNATURE.len() + block.len();
        dest.write_u16::<BigEndian>(jpeg::APP1)?;
        dest.write_u16::<BigEndian>(length as u16)?;
        dest.write_all(jpeg::EXIF_SIGNATURE)?;
        dest.write_all(block)?;
    }

    // main pass: everything else in source order
    source.seek(SeekFrom::Start(0))?;
    expect_soi(source)?;
    loop {
        match read_segment(source)? {
            Segment::ScanStart => {
                dest.write_u16::<BigEndian>(jpeg::SOS)?;
                io::copy(source, dest)?;
                return Ok(());
            }
            Segment::Standalone(marker) => dest.write_u16::<BigEndian>(marker)?,
            Segment::Tagged { marker, payload } => {
                if marker == jpeg::APP0 || drops_segment(marker, &payload, block_status) {
                    continue;
                }
                write_segment(dest, marker, &payload)?;
            }
        }
    }
}

/// Whether a source segment is left out of the rebuilt image
fn drops_segment(marker: u16, payload: &[u8], block_status: &[BlockStatus; 6]) -> bool {
    match classify(marker, payload) {
        // the EXIF segment is always dropped, its replacement has been
        // written up front already
        Some(ImageFileBlock::Exif) => true,
        Some(kind) => block_status[kind.index()] == BlockStatus::Removed,
        None => false,
    }
}

/// Maps a segment to the metadata block kind it carries
fn classify(marker: u16, payload: &[u8]) -> Option<ImageFileBlock> {
    match marker {
        jpeg::APP1 if payload.starts_with(jpeg::EXIF_SIGNATURE) => Some(ImageFileBlock::Exif),
        jpeg::APP1 if payload.starts_with(jpeg::XMP_SIGNATURE) => Some(ImageFileBlock::Xmp),
        jpeg::APP13 if payload.starts_with(jpeg::IPTC_SIGNATURE) => Some(ImageFileBlock::Iptc),
        jpeg::COM => Some(ImageFileBlock::JpegComment),
        _ => None,
    }
}

fn expect_soi(reader: &mut dyn SeekableReader) -> ExifResult<u16> {
    let marker = reader.read_u16::<BigEndian>().map_err(truncated)?;
    if marker != jpeg::SOI {
        return Err(ExifError::ImageStructure(
            "JPEG stream does not start with an SOI marker".to_string(),
        ));
    }
    Ok(marker)
}

/// Reads the next segment of the marker list
fn read_segment(reader: &mut dyn SeekableReader) -> ExifResult<Segment> {
    let marker = reader.read_u16::<BigEndian>().map_err(truncated)?;
    if marker & 0xFF00 != 0xFF00 {
        return Err(ExifError::ImageStructure(format!(
            "invalid JPEG marker 0x{:04X}",
            marker
        )));
    }
    if marker == jpeg::SOS {
        return Ok(Segment::ScanStart);
    }
    if marker == jpeg::TEM || (jpeg::RST0..=jpeg::EOI).contains(&marker) {
        return Ok(Segment::Standalone(marker));
    }

    let length = reader.read_u16::<BigEndian>().map_err(truncated)? as usize;
    if length < 2 {
        return Err(ExifError::ImageStructure(format!(
            "JPEG segment 0x{:04X} has an invalid length of {}",
            marker, length
        )));
    }
    let mut payload = vec![0u8; length - 2];
    reader.read_exact(&mut payload).map_err(truncated)?;
    Ok(Segment::Tagged { marker, payload })
}

fn write_segment(dest: &mut dyn SeekableWriter, marker: u16, payload: &[u8]) -> ExifResult<()> {
    dest.write_u16::<BigEndian>(marker)?;
    dest.write_u16::<BigEndian>(payload.len() as u16 + 2)?;
    dest.write_all(payload)?;
    Ok(())
}

fn truncated(error: io::Error) -> ExifError {
    if error.kind() == ErrorKind::UnexpectedEof {
        ExifError::ImageStructure("unexpected end of JPEG stream".to_string())
    } else {
        ExifError::IoError(error)
    }
}
