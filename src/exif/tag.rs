//! Tag entries and IFD tables
//!
//! A TagItem is one IFD entry with its decoded value storage, an IfdTable
//! is the set of entries of one IFD keyed by tag id. Values of at most
//! 4 bytes live inline in the entry's own value slot, larger values are
//! outsourced to a separate region addressed by an absolute offset.

use std::collections::BTreeMap;
use std::fmt;
use std::io::SeekFrom;
use std::sync::Arc;

use log::debug;

use crate::exif::constants::limits;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::types::TagType;
use crate::exif::values::ExifRational;
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;

/// Storage behind a tag value
///
/// Loading borrows from the resident block where possible; any mutation
/// promotes the value to an owned buffer first.
#[derive(Debug, Clone)]
enum TagValue {
    /// Value of at most 4 bytes held in the entry's own slot
    Inline([u8; 4]),
    /// Outsourced value still shared with the loaded source block
    Borrowed { block: Arc<Vec<u8>>, start: usize },
    /// Outsourced value owned by this tag; the buffer length is the
    /// allocated capacity, the logical length comes from type and count
    Owned(Vec<u8>),
}

/// One IFD entry: tag id, field type, element count and value
#[derive(Debug, Clone)]
pub struct TagItem {
    tag_id: u16,
    tag_type: TagType,
    value_count: u32,
    value: TagValue,
    /// Absolute offset the value had in the source, 0 if inline or new
    original_offset: u32,
}

fn byte_count_for(tag_type: TagType, value_count: u32) -> usize {
    (tag_type.size() as u64 * value_count as u64) as usize
}

impl TagItem {
    /// Creates a tag with a zero-filled value
    pub fn new(tag_id: u16, tag_type: TagType, value_count: u32) -> TagItem {
        let byte_count = byte_count_for(tag_type, value_count);
        let value = if byte_count <= 4 {
            TagValue::Inline([0; 4])
        } else {
            TagValue::Owned(vec![0; byte_count])
        };
        TagItem {
            tag_id,
            tag_type,
            value_count,
            value,
            original_offset: 0,
        }
    }

    /// Decodes the 12-byte entry at `entry_at` in a resident block
    ///
    /// Outsourced values stay as a borrowed range of the shared block.
    /// Returns Ok(None) for field types the codec does not know, which
    /// the caller skips.
    ///
    /// # Arguments
    /// * `block` - The resident EXIF block, shared between tags
    /// * `entry_at` - Index of the entry's first byte within the block
    /// * `handler` - Byte order strategy for the block
    pub fn from_resident_entry(
        block: &Arc<Vec<u8>>,
        entry_at: usize,
        handler: &dyn ByteOrderHandler,
    ) -> ExifResult<Option<TagItem>> {
        if entry_at + limits::IFD_ENTRY_SIZE > block.len() {
            return Err(ExifError::IllegalExifBlock(
                "IFD entry exceeds the block".to_string(),
            ));
        }
        let tag_id = handler.get_u16(block, entry_at);
        let type_code = handler.get_u16(block, entry_at + 2);
        let value_count = handler.get_u32(block, entry_at + 4);
        let tag_type = match TagType::from_u16(type_code) {
            Some(t) => t,
            None => {
                debug!("Skipping tag 0x{:04X} with unknown field type {}", tag_id, type_code);
                return Ok(None);
            }
        };

        let byte_count = byte_count_for(tag_type, value_count);
        if byte_count <= 4 {
            let mut inline = [0u8; 4];
            inline.copy_from_slice(&block[entry_at + 8..entry_at + 12]);
            return Ok(Some(TagItem {
                tag_id,
                tag_type,
                value_count,
                value: TagValue::Inline(inline),
                original_offset: 0,
            }));
        }

        let offset = handler.get_u32(block, entry_at + 8);
        let end = offset as u64 + byte_count as u64;
        if end > block.len() as u64 {
            return Err(ExifError::IllegalExifBlock(format!(
                "value of tag 0x{:04X} lies outside the block",
                tag_id
            )));
        }
        Ok(Some(TagItem {
            tag_id,
            tag_type,
            value_count,
            value: TagValue::Borrowed {
                block: Arc::clone(block),
                start: offset as usize,
            },
            original_offset: offset,
        }))
    }

    /// Decodes the 12-byte entry at `entry_at` in an IFD buffer read
    /// from a TIFF stream
    ///
    /// Outsourced values are read from the stream right away, so only
    /// metadata bytes are ever materialized, never image strips.
    ///
    /// # Arguments
    /// * `entries` - Buffer holding the raw entry array
    /// * `entry_at` - Index of the entry's first byte within that buffer
    /// * `reader` - The source stream, repositioned as needed
    /// * `stream_len` - Total stream length for bounds checking
    /// * `handler` - Byte order strategy for the file
    pub fn from_stream_entry(
        entries: &[u8],
        entry_at: usize,
        reader: &mut dyn SeekableReader,
        stream_len: u64,
        handler: &dyn ByteOrderHandler,
    ) -> ExifResult<Option<TagItem>> {
        if entry_at + limits::IFD_ENTRY_SIZE > entries.len() {
            return Err(ExifError::IllegalExifBlock(
                "IFD entry exceeds the entry array".to_string(),
            ));
        }
        let tag_id = handler.get_u16(entries, entry_at);
        let type_code = handler.get_u16(entries, entry_at + 2);
        let value_count = handler.get_u32(entries, entry_at + 4);
        let tag_type = match TagType::from_u16(type_code) {
            Some(t) => t,
            None => {
                debug!("Skipping tag 0x{:04X} with unknown field type {}", tag_id, type_code);
                return Ok(None);
            }
        };

        let byte_count = byte_count_for(tag_type, value_count);
        if byte_count <= 4 {
            let mut inline = [0u8; 4];
            inline.copy_from_slice(&entries[entry_at + 8..entry_at + 12]);
            return Ok(Some(TagItem {
                tag_id,
                tag_type,
                value_count,
                value: TagValue::Inline(inline),
                original_offset: 0,
            }));
        }

        let offset = handler.get_u32(entries, entry_at + 8);
        if offset as u64 + byte_count as u64 > stream_len {
            return Err(ExifError::IllegalExifBlock(format!(
                "value of tag 0x{:04X} lies outside the file",
                tag_id
            )));
        }
        let mut buffer = vec![0u8; byte_count];
        reader.seek(SeekFrom::Start(offset as u64))?;
        reader.read_exact(&mut buffer)?;
        Ok(Some(TagItem {
            tag_id,
            tag_type,
            value_count,
            value: TagValue::Owned(buffer),
            original_offset: offset,
        }))
    }

    pub fn tag_id(&self) -> u16 {
        self.tag_id
    }

    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    pub fn value_count(&self) -> u32 {
        self.value_count
    }

    /// Absolute offset the value had when loaded, 0 if inline or new
    pub fn original_offset(&self) -> u32 {
        self.original_offset
    }

    /// Logical value length in bytes
    pub fn byte_count(&self) -> usize {
        byte_count_for(self.tag_type, self.value_count)
    }

    /// True if the value does not fit the entry's 4-byte slot
    pub fn is_outsourced(&self) -> bool {
        self.byte_count() > 4
    }

    /// Bytes the value currently occupies
    pub fn value_bytes(&self) -> &[u8] {
        let byte_count = self.byte_count();
        match &self.value {
            TagValue::Inline(slot) => &slot[..byte_count],
            TagValue::Borrowed { block, start } => &block[*start..*start + byte_count],
            TagValue::Owned(buffer) => &buffer[..byte_count],
        }
    }

    /// Mutable access to the value bytes, promoting a borrowed value
    /// to an owned buffer first
    pub fn value_bytes_mut(&mut self) -> &mut [u8] {
        if let TagValue::Borrowed { .. } = self.value {
            let copy = self.value_bytes().to_vec();
            self.value = TagValue::Owned(copy);
        }
        let byte_count = self.byte_count();
        match &mut self.value {
            TagValue::Inline(slot) => &mut slot[..byte_count],
            TagValue::Owned(buffer) => &mut buffer[..byte_count],
            TagValue::Borrowed { .. } => unreachable!("borrowed value after promotion"),
        }
    }

    fn capacity(&self) -> usize {
        match &self.value {
            TagValue::Inline(_) => 4,
            TagValue::Borrowed { .. } => self.byte_count(),
            TagValue::Owned(buffer) => buffer.len(),
        }
    }

    /// Changes type and element count, reallocating if the new byte
    /// count exceeds the allocated capacity
    ///
    /// Reallocation doubles the capacity (at least 32 bytes) and
    /// zero-fills it; `keep_existing` copies the old value bytes
    /// forward. Within capacity the storage is reused as-is.
    pub fn set_type_and_count(&mut self, tag_type: TagType, value_count: u32, keep_existing: bool) {
        let new_byte_count = byte_count_for(tag_type, value_count);
        if new_byte_count > self.capacity() {
            let new_capacity = (self.capacity() * 2).max(new_byte_count).max(32);
            let mut buffer = vec![0u8; new_capacity];
            if keep_existing {
                let old = self.value_bytes();
                buffer[..old.len()].copy_from_slice(old);
            }
            self.value = TagValue::Owned(buffer);
        }
        self.tag_type = tag_type;
        self.value_count = value_count;
    }

    /// Replaces type, count and value in one step
    pub fn set_raw(&mut self, tag_type: TagType, value_count: u32, bytes: &[u8]) {
        self.set_type_and_count(tag_type, value_count, false);
        let slot = self.value_bytes_mut();
        let n = bytes.len().min(slot.len());
        slot[..n].copy_from_slice(&bytes[..n]);
        for leftover in slot.iter_mut().skip(n) {
            *leftover = 0;
        }
    }

    /// Reads an unsigned element; None if the index is out of range or
    /// the field type has no unsigned integer reading
    pub fn read_uint_element(&self, index: u32, handler: &dyn ByteOrderHandler) -> Option<u32> {
        if index >= self.value_count {
            return None;
        }
        let bytes = self.value_bytes();
        let at = index as usize * self.tag_type.size() as usize;
        match self.tag_type {
            TagType::Byte | TagType::Undefined => Some(bytes[at] as u32),
            TagType::UShort => Some(handler.get_u16(bytes, at) as u32),
            TagType::ULong => Some(handler.get_u32(bytes, at)),
            _ => None,
        }
    }

    /// Writes an unsigned element, extending the count to `index + 1`
    /// if the tag was shorter; false if the field type cannot take it
    pub fn write_uint_element(
        &mut self,
        index: u32,
        value: u32,
        handler: &dyn ByteOrderHandler,
    ) -> bool {
        if !matches!(
            self.tag_type,
            TagType::Byte | TagType::Undefined | TagType::UShort | TagType::ULong
        ) {
            return false;
        }
        if index >= self.value_count {
            self.set_type_and_count(self.tag_type, index + 1, true);
        }
        let element_size = self.tag_type.size() as usize;
        let at = index as usize * element_size;
        let bytes = self.value_bytes_mut();
        match element_size {
            1 => bytes[at] = value as u8,
            2 => handler.put_u16(bytes, at, value as u16),
            _ => handler.put_u32(bytes, at, value),
        }
        true
    }

    /// Reads a signed element; unsigned types that fit an i32 are
    /// accepted as well
    pub fn read_int_element(&self, index: u32, handler: &dyn ByteOrderHandler) -> Option<i32> {
        if index >= self.value_count {
            return None;
        }
        let bytes = self.value_bytes();
        let at = index as usize * self.tag_type.size() as usize;
        match self.tag_type {
            TagType::SByte => Some(bytes[at] as i8 as i32),
            TagType::SShort => Some(handler.get_u16(bytes, at) as i16 as i32),
            TagType::SLong => Some(handler.get_u32(bytes, at) as i32),
            TagType::Byte | TagType::Undefined => Some(bytes[at] as i32),
            TagType::UShort => Some(handler.get_u16(bytes, at) as i32),
            TagType::ULong => {
                let value = handler.get_u32(bytes, at);
                if value <= i32::MAX as u32 {
                    Some(value as i32)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Writes a signed element, extending the count like the unsigned
    /// variant; false if the field type is not a signed integer
    pub fn write_int_element(
        &mut self,
        index: u32,
        value: i32,
        handler: &dyn ByteOrderHandler,
    ) -> bool {
        if !matches!(self.tag_type, TagType::SByte | TagType::SShort | TagType::SLong) {
            return false;
        }
        if index >= self.value_count {
            self.set_type_and_count(self.tag_type, index + 1, true);
        }
        let element_size = self.tag_type.size() as usize;
        let at = index as usize * element_size;
        let bytes = self.value_bytes_mut();
        match element_size {
            1 => bytes[at] = value as u8,
            2 => handler.put_u16(bytes, at, value as u16),
            _ => handler.put_u32(bytes, at, value as u32),
        }
        true
    }

    /// Reads a rational element of either sign flavor
    pub fn read_rational_element(
        &self,
        index: u32,
        handler: &dyn ByteOrderHandler,
    ) -> Option<ExifRational> {
        if index >= self.value_count {
            return None;
        }
        let bytes = self.value_bytes();
        let at = index as usize * 8;
        match self.tag_type {
            TagType::URational => Some(ExifRational::new(
                handler.get_u32(bytes, at),
                handler.get_u32(bytes, at + 4),
            )),
            TagType::SRational => Some(ExifRational::new_signed(
                handler.get_u32(bytes, at) as i32,
                handler.get_u32(bytes, at + 4) as i32,
            )),
            _ => None,
        }
    }

    /// Writes a rational element, extending the count if needed;
    /// unsigned slots take the absolute value
    pub fn write_rational_element(
        &mut self,
        index: u32,
        value: ExifRational,
        handler: &dyn ByteOrderHandler,
    ) -> bool {
        let (numerator, denominator) = match self.tag_type {
            TagType::URational => (value.numerator, value.denominator),
            TagType::SRational => {
                let (n, d) = value.signed_parts();
                (n as u32, d as u32)
            }
            _ => return false,
        };
        if index >= self.value_count {
            self.set_type_and_count(self.tag_type, index + 1, true);
        }
        let at = index as usize * 8;
        let bytes = self.value_bytes_mut();
        handler.put_u32(bytes, at, numerator);
        handler.put_u32(bytes, at + 4, denominator);
        true
    }

    /// Reads a floating point element
    pub fn read_double_element(&self, index: u32, handler: &dyn ByteOrderHandler) -> Option<f64> {
        if index >= self.value_count {
            return None;
        }
        let bytes = self.value_bytes();
        let at = index as usize * self.tag_type.size() as usize;
        match self.tag_type {
            TagType::Float => Some(handler.get_f32(bytes, at) as f64),
            TagType::Double => Some(handler.get_f64(bytes, at)),
            _ => None,
        }
    }

    /// Writes a floating point element, extending the count if needed
    pub fn write_double_element(
        &mut self,
        index: u32,
        value: f64,
        handler: &dyn ByteOrderHandler,
    ) -> bool {
        if !matches!(self.tag_type, TagType::Float | TagType::Double) {
            return false;
        }
        if index >= self.value_count {
            self.set_type_and_count(self.tag_type, index + 1, true);
        }
        let tag_type = self.tag_type;
        let at = index as usize * tag_type.size() as usize;
        let bytes = self.value_bytes_mut();
        match tag_type {
            TagType::Float => handler.put_f32(bytes, at, value as f32),
            _ => handler.put_f64(bytes, at, value),
        }
        true
    }

    /// Reverses the byte order of every multi-byte element in place
    ///
    /// Rationals swap their two 4-byte halves independently. Byte-wide
    /// types are unaffected.
    pub fn swap_byte_order(&mut self) {
        let unit = match self.tag_type {
            TagType::UShort | TagType::SShort => 2,
            TagType::ULong
            | TagType::SLong
            | TagType::Float
            | TagType::URational
            | TagType::SRational => 4,
            TagType::Double => 8,
            _ => return,
        };
        if self.byte_count() == 0 {
            return;
        }
        for chunk in self.value_bytes_mut().chunks_exact_mut(unit) {
            chunk.reverse();
        }
    }
}

impl fmt::Display for TagItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag 0x{:04X}, Type: {}, Count: {}, Bytes: {}",
            self.tag_id,
            self.tag_type,
            self.value_count,
            self.byte_count()
        )
    }
}

/// The tag entries of one IFD, keyed and ordered by tag id
#[derive(Debug, Clone, Default)]
pub struct IfdTable {
    entries: BTreeMap<u16, TagItem>,
}

impl IfdTable {
    /// Creates an empty table
    pub fn new() -> IfdTable {
        IfdTable {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, tag_id: u16) -> Option<&TagItem> {
        self.entries.get(&tag_id)
    }

    pub fn get_mut(&mut self, tag_id: u16) -> Option<&mut TagItem> {
        self.entries.get_mut(&tag_id)
    }

    /// Inserts a tag, replacing any previous one with the same id
    pub fn insert(&mut self, item: TagItem) {
        self.entries.insert(item.tag_id(), item);
    }

    /// Inserts a tag unless the id is already present
    ///
    /// This is the load path rule: the first occurrence of a duplicated
    /// tag id wins, later ones are dropped.
    pub fn insert_if_absent(&mut self, item: TagItem) -> bool {
        if self.entries.contains_key(&item.tag_id()) {
            debug!("Dropping duplicate tag 0x{:04X}", item.tag_id());
            return false;
        }
        self.entries.insert(item.tag_id(), item);
        true
    }

    /// Returns the tag for this id, creating a zero-count one if absent
    pub fn entry_or_new(&mut self, tag_id: u16, tag_type: TagType) -> &mut TagItem {
        self.entries
            .entry(tag_id)
            .or_insert_with(|| TagItem::new(tag_id, tag_type, 0))
    }

    pub fn remove(&mut self, tag_id: u16) -> bool {
        self.entries.remove(&tag_id).is_some()
    }

    pub fn contains(&self, tag_id: u16) -> bool {
        self.entries.contains_key(&tag_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keeps only the entries the predicate approves of
    pub fn retain(&mut self, predicate: impl FnMut(&u16, &mut TagItem) -> bool) {
        self.entries.retain(predicate);
    }

    /// Iterates entries in ascending tag id order
    pub fn iter(&self) -> impl Iterator<Item = &TagItem> {
        self.entries.values()
    }

    /// Mutable iteration in ascending tag id order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TagItem> {
        self.entries.values_mut()
    }

    /// Snapshot of the tag ids in ascending order
    pub fn tag_ids(&self) -> Vec<u16> {
        self.entries.keys().copied().collect()
    }
}
