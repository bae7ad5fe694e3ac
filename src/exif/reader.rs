//! EXIF block reading
//!
//! Walks the IFD pointer graph of a TIFF-shaped metadata block and
//! populates the five logical tag tables. JPEG and PNG hand in a
//! resident byte block; true TIFF files are read directly from the
//! source stream so image strips are never buffered.

use std::sync::Arc;

use log::{debug, warn};

use crate::exif::constants::{limits, tags};
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::tag::{IfdTable, TagItem};
use crate::exif::types::{ExifIfd, TiffHeader};
use crate::exif::validation::validate_ifd_offset;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;

/// Everything the reader extracts from one EXIF block
pub struct BlockContent {
    pub byte_order: ByteOrder,
    /// The five tables, indexed by ExifIfd
    pub tables: [IfdTable; 5],
    /// Thumbnail bytes sliced out of the block (JPEG/PNG only)
    pub thumbnail: Option<Vec<u8>>,
    /// True original offset of an outsourced maker note, 0 if absent
    pub maker_note_original_offset: u32,
    /// Offset of the next image's Primary IFD in a TIFF chain, 0 if none
    pub next_image_offset: u32,
}

/// Reader for the IFD tree of one EXIF block
pub struct ExifBlockReader {
    handler: Box<dyn ByteOrderHandler>,
}

impl ExifBlockReader {
    pub fn new(byte_order: ByteOrder) -> ExifBlockReader {
        ExifBlockReader {
            handler: byte_order.create_handler(),
        }
    }

    /// Parses a complete resident block: TIFF header plus IFD tree
    ///
    /// This is the JPEG/PNG path; the block is the APP1 payload after
    /// the EXIF signature, or the eXIf chunk payload.
    pub fn read_resident_block(block: Vec<u8>) -> ExifResult<BlockContent> {
        let header = TiffHeader::read_in(&block)?;
        let reader = ExifBlockReader::new(header.byte_order);
        let block = Arc::new(block);
        reader.read_resident_tree(&block, header.byte_order, header.first_ifd_offset)
    }

    fn read_resident_tree(
        &self,
        block: &Arc<Vec<u8>>,
        byte_order: ByteOrder,
        primary_offset: u32,
    ) -> ExifResult<BlockContent> {
        let mut tables: [IfdTable; 5] = Default::default();

        let (primary, primary_next) = self.read_resident_ifd(block, primary_offset)?;
        let exif_pointer = self.pointer_value(&primary, tags::EXIF_IFD_POINTER);
        let gps_pointer = self.pointer_value(&primary, tags::GPS_IFD_POINTER);
        tables[ExifIfd::PrimaryData.index()] = primary;

        let (private, _) = self.read_resident_ifd(block, exif_pointer)?;
        let interop_pointer = self.pointer_value(&private, tags::INTEROP_IFD_POINTER);
        let maker_note_original_offset = maker_note_offset(&private, &*self.handler);
        tables[ExifIfd::PrivateData.index()] = private;

        let (gps, _) = self.read_resident_ifd(block, gps_pointer)?;
        tables[ExifIfd::GpsInfoData.index()] = gps;

        let (interop, _) = self.read_resident_ifd(block, interop_pointer)?;
        tables[ExifIfd::Interoperability.index()] = interop;

        let (thumbnail_table, _) = self.read_resident_ifd(block, primary_next)?;
        let thumbnail = self.slice_thumbnail(block, &thumbnail_table);
        tables[ExifIfd::ThumbnailData.index()] = thumbnail_table;

        Ok(BlockContent {
            byte_order,
            tables,
            thumbnail,
            maker_note_original_offset,
            next_image_offset: 0,
        })
    }

    /// Reads one image's tag tree from a TIFF stream
    ///
    /// The trailing offset of the Primary IFD is reported as the next
    /// image's Primary offset rather than a thumbnail table; multi-page
    /// files chain through it.
    ///
    /// # Arguments
    /// * `reader` - The source stream
    /// * `stream_len` - Total stream length for bounds checking
    /// * `byte_order` - Byte order from the file header
    /// * `primary_offset` - Offset of this image's Primary IFD
    pub fn read_stream_tree(
        &self,
        reader: &mut dyn SeekableReader,
        stream_len: u64,
        byte_order: ByteOrder,
        primary_offset: u32,
    ) -> ExifResult<BlockContent> {
        let mut tables: [IfdTable; 5] = Default::default();

        let (primary, next_image_offset) =
            self.read_stream_ifd(reader, stream_len, primary_offset)?;
        let exif_pointer = self.pointer_value(&primary, tags::EXIF_IFD_POINTER);
        let gps_pointer = self.pointer_value(&primary, tags::GPS_IFD_POINTER);
        tables[ExifIfd::PrimaryData.index()] = primary;

        let (private, _) = self.read_stream_ifd(reader, stream_len, exif_pointer)?;
        let interop_pointer = self.pointer_value(&private, tags::INTEROP_IFD_POINTER);
        let maker_note_original_offset = maker_note_offset(&private, &*self.handler);
        tables[ExifIfd::PrivateData.index()] = private;

        let (gps, _) = self.read_stream_ifd(reader, stream_len, gps_pointer)?;
        tables[ExifIfd::GpsInfoData.index()] = gps;

        let (interop, _) = self.read_stream_ifd(reader, stream_len, interop_pointer)?;
        tables[ExifIfd::Interoperability.index()] = interop;

        Ok(BlockContent {
            byte_order,
            tables,
            thumbnail: None,
            maker_note_original_offset,
            next_image_offset,
        })
    }

    /// Reads the IFD at `offset` in a resident block
    ///
    /// Offset 0 stands for a missing IFD and yields an empty table.
    /// Returns the table and the trailing next-IFD offset.
    fn read_resident_ifd(
        &self,
        block: &Arc<Vec<u8>>,
        offset: u32,
    ) -> ExifResult<(IfdTable, u32)> {
        let mut table = IfdTable::new();
        if offset == 0 {
            return Ok((table, 0));
        }
        validate_ifd_offset(offset as u64, block.len() as u64)?;

        let at = offset as usize;
        let entry_count = self.handler.get_u16(block, at) as usize;
        let next_at = at + 2 + entry_count * limits::IFD_ENTRY_SIZE;
        if next_at + 4 > block.len() {
            return Err(ExifError::IllegalExifBlock(format!(
                "IFD at offset {} exceeds the block",
                offset
            )));
        }

        for i in 0..entry_count {
            let entry_at = at + 2 + i * limits::IFD_ENTRY_SIZE;
            if let Some(item) = TagItem::from_resident_entry(block, entry_at, &*self.handler)? {
                table.insert_if_absent(item);
            }
        }
        let next = self.handler.get_u32(block, next_at);
        debug!("Read IFD at offset {} with {} entries", offset, table.len());
        Ok((table, next))
    }

    /// Reads the IFD at `offset` from a TIFF stream
    fn read_stream_ifd(
        &self,
        reader: &mut dyn SeekableReader,
        stream_len: u64,
        offset: u32,
    ) -> ExifResult<(IfdTable, u32)> {
        let mut table = IfdTable::new();
        if offset == 0 {
            return Ok((table, 0));
        }
        validate_ifd_offset(offset as u64, stream_len)?;

        reader.seek(std::io::SeekFrom::Start(offset as u64))?;
        let entry_count = self.handler.read_u16(reader)? as usize;
        let array_len = entry_count * limits::IFD_ENTRY_SIZE + 4;
        if offset as u64 + 2 + array_len as u64 > stream_len {
            return Err(ExifError::IllegalExifBlock(format!(
                "IFD at offset {} exceeds the file",
                offset
            )));
        }
        let mut entries = vec![0u8; array_len];
        reader.read_exact(&mut entries)?;

        for i in 0..entry_count {
            let entry_at = i * limits::IFD_ENTRY_SIZE;
            if let Some(item) = TagItem::from_stream_entry(
                &entries,
                entry_at,
                reader,
                stream_len,
                &*self.handler,
            )? {
                table.insert_if_absent(item);
            }
        }
        let next = self.handler.get_u32(&entries, entry_count * limits::IFD_ENTRY_SIZE);
        debug!("Read IFD at offset {} with {} entries", offset, table.len());
        Ok((table, next))
    }

    /// First element of a pointer tag, 0 if the tag is missing
    fn pointer_value(&self, table: &IfdTable, tag_id: u16) -> u32 {
        table
            .get(tag_id)
            .and_then(|item| item.read_uint_element(0, &*self.handler))
            .unwrap_or(0)
    }

    /// Cuts the thumbnail bytes out of a resident block
    ///
    /// A thumbnail that points outside the block is dropped rather than
    /// failing the whole load.
    fn slice_thumbnail(&self, block: &Arc<Vec<u8>>, table: &IfdTable) -> Option<Vec<u8>> {
        let offset = self.pointer_value(table, tags::THUMBNAIL_OFFSET) as usize;
        let length = self.pointer_value(table, tags::THUMBNAIL_LENGTH) as usize;
        if length == 0 {
            return None;
        }
        if offset + length > block.len() {
            warn!(
                "Thumbnail range {}..{} lies outside the block, ignoring it",
                offset,
                offset + length
            );
            return None;
        }
        Some(block[offset..offset + length].to_vec())
    }
}

/// True original offset of an outsourced maker note
///
/// Any correction a previous writer left in the offset schema tag is
/// subtracted out, so the tracked value is correction-free.
fn maker_note_offset(private: &IfdTable, handler: &dyn ByteOrderHandler) -> u32 {
    match private.get(tags::MAKER_NOTE) {
        Some(note) if note.is_outsourced() => {
            let schema = private
                .get(tags::OFFSET_SCHEMA)
                .and_then(|item| item.read_int_element(0, handler))
                .unwrap_or(0);
            note.original_offset().wrapping_sub(schema as u32)
        }
        _ => 0,
    }
}
