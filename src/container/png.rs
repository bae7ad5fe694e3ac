//! PNG chunk scanning and rebuilding
//!
//! A PNG file is the 8-byte signature followed by length-type-payload-
//! CRC chunks up to IEND. The EXIF block travels in an eXIf chunk, XMP
//! and IPTC in keyword-tagged iTXt chunks, free-form text in tEXt and
//! the modification time in tIME. Only the eXIf chunk's CRC is checked
//! on load; a fresh CRC is computed for the chunk written on save.

use std::io::{self, ErrorKind, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::Crc;
use log::debug;

use crate::exif::constants::png;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::types::{BlockStatus, ImageFileBlock};
use crate::io::seekable::{SeekableReader, SeekableWriter};

/// What a scan of the chunk list found
pub struct PngScan {
    pub exif_block: Option<Vec<u8>>,
    pub block_status: [BlockStatus; 6],
}

/// Collects the EXIF block and the auxiliary block presence flags
pub fn scan(reader: &mut dyn SeekableReader) -> ExifResult<PngScan> {
    expect_signature(reader)?;

    let mut exif_block = None;
    let mut block_status = [BlockStatus::NonExistent; 6];
    loop {
        let (length, chunk_type) = read_chunk_header(reader)?;
        match chunk_type {
            png::IEND => break,
            png::EXIF => {
                let payload = read_payload(reader, length)?;
                let stored_crc = reader.read_u32::<BigEndian>().map_err(truncated)?;
                let computed = chunk_crc(&chunk_type, &payload);
                if computed != stored_crc {
                    return Err(ExifError::ImageStructure(format!(
                        "eXIf chunk CRC mismatch: stored 0x{:08X}, computed 0x{:08X}",
                        stored_crc, computed
                    )));
                }
                block_status[ImageFileBlock::Exif.index()] = BlockStatus::Existent;
                if exif_block.is_none() {
                    debug!("Found eXIf chunk with {} block bytes", payload.len());
                    exif_block = Some(payload);
                }
            }
            png::ITXT => {
                let payload = read_payload(reader, length)?;
                skip_bytes(reader, 4)?;
                if let Some(kind) = classify_text(&payload) {
                    block_status[kind.index()] = BlockStatus::Existent;
                }
            }
            png::TEXT => {
                block_status[ImageFileBlock::PngMetaData.index()] = BlockStatus::Existent;
                skip_bytes(reader, length as u64 + 4)?;
            }
            png::TIME => {
                block_status[ImageFileBlock::PngDateChanged.index()] = BlockStatus::Existent;
                skip_bytes(reader, length as u64 + 4)?;
            }
            _ => skip_bytes(reader, length as u64 + 4)?,
        }
    }
    Ok(PngScan {
        exif_block,
        block_status,
    })
}

/// Rewrites the image, inserting the fresh eXIf chunk after IHDR
pub fn save(
    source: &mut dyn SeekableReader,
    dest: &mut dyn SeekableWriter,
    block: Option<&[u8]>,
    block_status: &[BlockStatus; 6],
) -> ExifResult<()> {
    expect_signature(source)?;
    dest.write_all(&png::SIGNATURE)?;

    // IHDR must come first; the new eXIf chunk goes right behind it
    let (length, chunk_type) = read_chunk_header(source)?;
    if chunk_type != png::IHDR {
        return Err(ExifError::ImageStructure(
            "PNG stream does not start with an IHDR chunk".to_string(),
        ));
    }
    copy_chunk(source, dest, length, &chunk_type)?;
    if let Some(block) = block {
        write_chunk(dest, &png::EXIF, block)?;
    }

    loop {
        let (length, chunk_type) = read_chunk_header(source)?;
        match chunk_type {
            png::IEND => {
                copy_chunk(source, dest, length, &chunk_type)?;
                return Ok(());
            }
            // the old EXIF chunk was replaced or dropped up front
            png::EXIF => skip_bytes(source, length as u64 + 4)?,
            png::ITXT => {
                let payload = read_payload(source, length)?;
                let crc = source.read_u32::<BigEndian>().map_err(truncated)?;
                let removed = classify_text(&payload)
                    .map_or(false, |kind| block_status[kind.index()] == BlockStatus::Removed);
                if !removed {
                    dest.write_u32::<BigEndian>(length)?;
                    dest.write_all(&chunk_type)?;
                    dest.write_all(&payload)?;
                    dest.write_u32::<BigEndian>(crc)?;
                }
            }
            png::TEXT if block_status[ImageFileBlock::PngMetaData.index()] == BlockStatus::Removed => {
                skip_bytes(source, length as u64 + 4)?;
            }
            png::TIME
                if block_status[ImageFileBlock::PngDateChanged.index()]
                    == BlockStatus::Removed =>
            {
                skip_bytes(source, length as u64 + 4)?;
            }
            _ => copy_chunk(source, dest, length, &chunk_type)?,
        }
    }
}

/// Maps an iTXt chunk to the block kind its keyword announces
fn classify_text(payload: &[u8]) -> Option<ImageFileBlock> {
    if payload.starts_with(png::XMP_KEYWORD) {
        Some(ImageFileBlock::Xmp)
    } else if payload.starts_with(png::IPTC_KEYWORD) {
        Some(ImageFileBlock::Iptc)
    } else {
        None
    }
}

fn expect_signature(reader: &mut dyn SeekableReader) -> ExifResult<()> {
    reader.seek(SeekFrom::Start(0))?;
    let mut signature = [0u8; 8];
    reader.read_exact(&mut signature).map_err(truncated)?;
    if signature != png::SIGNATURE {
        return Err(ExifError::ImageStructure(
            "invalid PNG file signature".to_string(),
        ));
    }
    Ok(())
}

fn read_chunk_header(reader: &mut dyn SeekableReader) -> ExifResult<(u32, [u8; 4])> {
    let length = reader.read_u32::<BigEndian>().map_err(truncated)?;
    let mut chunk_type = [0u8; 4];
    reader.read_exact(&mut chunk_type).map_err(truncated)?;
    Ok((length, chunk_type))
}

fn read_payload(reader: &mut dyn SeekableReader, length: u32) -> ExifResult<Vec<u8>> {
    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).map_err(truncated)?;
    Ok(payload)
}

/// Copies payload and CRC of a chunk whose header is already consumed
fn copy_chunk(
    source: &mut dyn SeekableReader,
    dest: &mut dyn SeekableWriter,
    length: u32,
    chunk_type: &[u8; 4],
) -> ExifResult<()> {
    dest.write_u32::<BigEndian>(length)?;
    dest.write_all(chunk_type)?;
    let mut remaining = length as u64 + 4;
    let mut buffer = [0u8; 16384];
    while remaining > 0 {
        let step = remaining.min(buffer.len() as u64) as usize;
        source.read_exact(&mut buffer[..step]).map_err(truncated)?;
        dest.write_all(&buffer[..step])?;
        remaining -= step as u64;
    }
    Ok(())
}

/// Writes a chunk with a freshly computed CRC
fn write_chunk(dest: &mut dyn SeekableWriter, chunk_type: &[u8; 4], payload: &[u8]) -> ExifResult<()> {
    dest.write_u32::<BigEndian>(payload.len() as u32)?;
    dest.write_all(chunk_type)?;
    dest.write_all(payload)?;
    dest.write_u32::<BigEndian>(chunk_crc(chunk_type, payload))?;
    Ok(())
}

/// CRC32 over chunk type and payload, as the PNG spec defines it
fn chunk_crc(chunk_type: &[u8; 4], payload: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(chunk_type);
    crc.update(payload);
    crc.sum()
}

fn skip_bytes(reader: &mut dyn SeekableReader, count: u64) -> ExifResult<()> {
    reader.seek(SeekFrom::Current(count as i64))?;
    Ok(())
}

fn truncated(error: io::Error) -> ExifError {
    if error.kind() == ErrorKind::UnexpectedEof {
        ExifError::ImageStructure("unexpected end of PNG stream".to_string())
    } else {
        ExifError::IoError(error)
    }
}
