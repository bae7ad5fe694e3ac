//! TIFF image rebuilding
//!
//! A TIFF file is the block: the 8-byte header points at the first
//! Primary IFD and every image holds its pixel data in strips or tiles
//! addressed by offset/byte-count tag arrays. Saving walks the source
//! image chain, copies the pixel segments into the new layout, rewrites
//! the placement arrays and emits each image's tag tree. An image's
//! trailing next-image pointer is only known once the following image
//! has been placed, so each emitted tree is held back and flushed one
//! step behind the walk.

use std::io::SeekFrom;

use log::debug;

use crate::exif::constants::{header, limits, tags};
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::reader::ExifBlockReader;
use crate::exif::tag::IfdTable;
use crate::exif::types::{ExifIfd, TagType, TiffHeader};
use crate::exif::validation;
use crate::exif::writer::ExifBlockWriter;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::{SeekableReader, SeekableWriter};

/// A serialized tree waiting for its next-image pointer
struct PendingTree {
    at: u64,
    bytes: Vec<u8>,
    next_slot: Option<usize>,
}

/// Rewrites the whole TIFF file with updated metadata
///
/// The first image's tag tree comes from the caller; the trees of any
/// chained images are taken from the source unchanged apart from their
/// relocated pixel segments. The caller's tables are not modified, the
/// layout rewrite happens on working copies.
pub fn save(
    source: &mut dyn SeekableReader,
    dest: &mut dyn SeekableWriter,
    byte_order: ByteOrder,
    tables: &[IfdTable; 5],
    maker_note_original_offset: u32,
    next_image_offset: u32,
) -> ExifResult<()> {
    source.seek(SeekFrom::Start(0))?;
    let source_header = TiffHeader::read(source)?;
    if source_header.byte_order != byte_order {
        return Err(ExifError::ImageStructure(
            "byte order of a TIFF image cannot change on save".to_string(),
        ));
    }
    let source_len = validation::stream_len(source)?;
    validation::check_stream_size(source_len)?;

    let handler = byte_order.create_handler();
    let writer = ExifBlockWriter::new(byte_order);
    let block_reader = ExifBlockReader::new(byte_order);

    let mut position = header::LENGTH as u64;
    let mut pending: Option<PendingTree> = None;
    let mut first_tree_offset = 0u32;
    let mut source_next = next_image_offset;
    let mut image_index = 0usize;

    loop {
        let (mut work_tables, note_offset) = if image_index == 0 {
            ((*tables).clone(), maker_note_original_offset)
        } else {
            let content =
                block_reader.read_stream_tree(source, source_len, byte_order, source_next)?;
            source_next = content.next_image_offset;
            (content.tables, content.maker_note_original_offset)
        };

        copy_image_data(
            source,
            dest,
            source_len,
            &mut position,
            &mut work_tables[ExifIfd::PrimaryData.index()],
            &*handler,
        )?;

        // trees start on 2-byte boundaries; the gap byte reads as zero
        if position % 2 == 1 {
            position += 1;
        }
        ensure_addressable(position)?;
        let tree = writer.write_tree(&mut work_tables, position as u32, note_offset);
        debug!(
            "Image {} tree at offset {}, {} bytes",
            image_index,
            position,
            tree.bytes.len()
        );
        if image_index == 0 {
            first_tree_offset = tree.primary_offset;
        }
        if let Some(held) = pending.take() {
            flush_tree(dest, held, Some(tree.primary_offset), &*handler)?;
        }
        let tree_length = tree.bytes.len() as u64;
        pending = Some(PendingTree {
            at: position,
            bytes: tree.bytes,
            next_slot: tree.next_image_patch,
        });
        position += tree_length;
        ensure_addressable(position)?;

        if source_next == 0 {
            break;
        }
        image_index += 1;
        if image_index > limits::MAX_IFD_COUNT {
            return Err(ExifError::ImageStructure(
                "TIFF image chain exceeds the supported depth".to_string(),
            ));
        }
    }

    // the last image ends the chain, its next pointer stays zero
    if let Some(held) = pending.take() {
        flush_tree(dest, held, None, &*handler)?;
    }

    dest.seek(SeekFrom::Start(0))?;
    let mut header_bytes = Vec::with_capacity(header::LENGTH);
    TiffHeader::write_into(&mut header_bytes, byte_order, first_tree_offset);
    dest.write_all(&header_bytes)?;
    Ok(())
}

/// Patches the held tree's next-image slot and writes it to its place
fn flush_tree(
    dest: &mut dyn SeekableWriter,
    mut held: PendingTree,
    next_offset: Option<u32>,
    handler: &dyn ByteOrderHandler,
) -> ExifResult<()> {
    if let (Some(slot), Some(offset)) = (held.next_slot, next_offset) {
        handler.put_u32(&mut held.bytes, slot, offset);
    }
    dest.seek(SeekFrom::Start(held.at))?;
    dest.write_all(&held.bytes)?;
    Ok(())
}

/// Copies the pixel segments of one image into the destination and
/// rewrites the offset array to the new locations
///
/// Handles the strip pair and the tile pair the same way. The rewritten
/// offset array is normalized to ULong so large files stay addressable.
fn copy_image_data(
    source: &mut dyn SeekableReader,
    dest: &mut dyn SeekableWriter,
    source_len: u64,
    position: &mut u64,
    primary: &mut IfdTable,
    handler: &dyn ByteOrderHandler,
) -> ExifResult<()> {
    let pairs = [
        (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS),
        (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS),
    ];
    for (offsets_tag, counts_tag) in pairs {
        let segment_count = match primary.get(offsets_tag) {
            Some(item) => item.value_count(),
            None => continue,
        };
        if segment_count == 0 {
            continue;
        }
        let counts = primary.get(counts_tag).ok_or_else(|| {
            ExifError::ImageStructure(format!(
                "segment offsets tag 0x{:04X} has no matching byte counts",
                offsets_tag
            ))
        })?;
        if counts.value_count() != segment_count {
            return Err(ExifError::ImageStructure(
                "segment offset and byte count arrays differ in length".to_string(),
            ));
        }

        let mut ranges = Vec::with_capacity(segment_count as usize);
        let offsets = primary.get(offsets_tag).ok_or_else(|| {
            ExifError::ImageStructure("segment offsets tag vanished".to_string())
        })?;
        for index in 0..segment_count {
            let offset = offsets.read_uint_element(index, handler).ok_or_else(|| {
                ExifError::ImageStructure("unreadable segment offset".to_string())
            })?;
            let length = counts.read_uint_element(index, handler).ok_or_else(|| {
                ExifError::ImageStructure("unreadable segment byte count".to_string())
            })?;
            if offset as u64 + length as u64 > source_len {
                return Err(ExifError::ImageStructure(format!(
                    "pixel segment at {} with {} bytes reaches beyond the stream",
                    offset, length
                )));
            }
            ranges.push((offset, length));
        }

        dest.seek(SeekFrom::Start(*position))?;
        let mut new_offsets = Vec::with_capacity(ranges.len());
        let mut buffer = [0u8; 16384];
        for (offset, length) in &ranges {
            ensure_addressable(*position)?;
            new_offsets.push(*position as u32);
            source.seek(SeekFrom::Start(*offset as u64))?;
            let mut remaining = *length as usize;
            while remaining > 0 {
                let step = remaining.min(buffer.len());
                source.read_exact(&mut buffer[..step])?;
                dest.write_all(&buffer[..step])?;
                remaining -= step;
            }
            *position += *length as u64;
        }
        ensure_addressable(*position)?;
        debug!(
            "Relocated {} pixel segments of tag 0x{:04X}",
            ranges.len(),
            offsets_tag
        );

        let item = primary.get_mut(offsets_tag).ok_or_else(|| {
            ExifError::ImageStructure("segment offsets tag vanished".to_string())
        })?;
        item.set_raw(TagType::ULong, segment_count, &[]);
        for (index, offset) in new_offsets.iter().enumerate() {
            item.write_uint_element(index as u32, *offset, handler);
        }
    }
    Ok(())
}

fn ensure_addressable(position: u64) -> ExifResult<()> {
    if position > limits::MAX_TIFF_BLOCK_SIZE {
        return Err(ExifError::ExifBlockTooLarge {
            size: position,
            max: limits::MAX_TIFF_BLOCK_SIZE,
        });
    }
    Ok(())
}
