//! EXIF block serialization
//!
//! Builds a fresh TIFF-shaped block from the five tag tables. Emission
//! works in two passes: the first appends IFDs to a growable buffer and
//! records patch requests for pointers whose targets are not laid out
//! yet, the second resolves every request once all offsets are known.
//! A request that cannot be resolved is a codec bug and panics.

use log::debug;

use crate::exif::constants::{limits, tags};
use crate::exif::tag::{IfdTable, TagItem};
use crate::exif::types::{ExifIfd, TagType, TiffHeader};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};

/// Offset of the tree within a JPEG/PNG block: right after the header
const BLOCK_TREE_BASE: u32 = 8;

/// Where a patched 4-byte slot gets its final value from
#[derive(Debug, Clone, Copy)]
enum PatchTarget {
    /// Absolute offset of an IFD, 0 if that IFD is never emitted
    IfdOffset(ExifIfd),
    /// Absolute offset of the thumbnail image bytes
    ThumbnailStart,
}

#[derive(Debug)]
struct PatchRequest {
    /// Buffer index of the 4-byte slot to fill in
    position: usize,
    target: PatchTarget,
}

/// What to write into an IFD's trailing 4-byte slot
#[derive(Clone, Copy)]
enum TrailingSlot {
    /// Literal zero, the IFD ends a chain
    Zero,
    /// Pointer to another IFD of this tree, patched later
    PatchIfd(ExifIfd),
    /// The next-image pointer of a TIFF chain, patched by the driver
    NextImage,
}

/// Facts about one emitted IFD the stage driver needs
struct EmittedIfd {
    /// Absolute offset the IFD landed on
    offset: u32,
    /// Absolute offset of an outsourced maker note value, if any
    maker_note_offset: Option<u32>,
    /// Buffer index of the offset schema tag's inline value slot
    schema_slot: Option<usize>,
    /// Buffer index of a NextImage trailing slot
    next_image_patch: Option<usize>,
}

/// One serialized image tree, ready for container wrapping
pub struct SerializedTree {
    /// The tree bytes, laid out for the requested base offset
    pub bytes: Vec<u8>,
    /// Absolute offset of the Primary IFD
    pub primary_offset: u32,
    /// Buffer index of the next-image slot for the multi-page driver
    pub next_image_patch: Option<usize>,
}

/// Writer for complete EXIF blocks and TIFF image trees
pub struct ExifBlockWriter {
    byte_order: ByteOrder,
    handler: Box<dyn ByteOrderHandler>,
}

impl ExifBlockWriter {
    pub fn new(byte_order: ByteOrder) -> ExifBlockWriter {
        ExifBlockWriter {
            byte_order,
            handler: byte_order.create_handler(),
        }
    }

    /// Serializes a complete block (TIFF header plus tree) for JPEG/PNG
    ///
    /// Returns None when the block would be empty, which callers treat
    /// as "carry no EXIF block at all".
    pub fn write_block(
        &self,
        tables: &mut [IfdTable; 5],
        thumbnail: Option<&[u8]>,
        maker_note_original_offset: u32,
    ) -> Option<Vec<u8>> {
        let tree = self.serialize_tree(
            tables,
            thumbnail,
            BLOCK_TREE_BASE,
            maker_note_original_offset,
            false,
        )?;
        let mut block = Vec::with_capacity(tree.bytes.len() + BLOCK_TREE_BASE as usize);
        TiffHeader::write_into(&mut block, self.byte_order, tree.primary_offset);
        block.extend_from_slice(&tree.bytes);
        Some(block)
    }

    /// Serializes one image's tree for a TIFF file
    ///
    /// `base_offset` is the absolute file offset the tree will land on;
    /// every pointer inside is laid out against it. The trailing slot of
    /// the Primary IFD is left for the multi-page driver to patch.
    pub fn write_tree(
        &self,
        tables: &mut [IfdTable; 5],
        base_offset: u32,
        maker_note_original_offset: u32,
    ) -> SerializedTree {
        self.serialize_tree(tables, None, base_offset, maker_note_original_offset, true)
            .expect("a TIFF image tree is never omitted")
    }

    fn serialize_tree(
        &self,
        tables: &mut [IfdTable; 5],
        thumbnail: Option<&[u8]>,
        base: u32,
        maker_note_original_offset: u32,
        tiff_chain: bool,
    ) -> Option<SerializedTree> {
        self.maintain_pointer_tags(tables);
        if !tiff_chain {
            self.maintain_thumbnail_tags(tables, thumbnail);
            let all_empty = tables.iter().all(|table| table.is_empty());
            if all_empty && thumbnail.is_none() {
                debug!("Block is empty, omitting it");
                return None;
            }
        }

        let mut emitter = TreeEmitter {
            handler: &*self.handler,
            base,
            buffer: Vec::new(),
            patches: Vec::new(),
        };
        let mut ifd_offsets: [Option<u32>; 5] = [None; 5];

        // Primary Data roots the tree; its trailing slot points at the
        // thumbnail IFD for JPEG/PNG and at the next image for TIFF
        let primary_trailing = if tiff_chain {
            TrailingSlot::NextImage
        } else {
            TrailingSlot::PatchIfd(ExifIfd::ThumbnailData)
        };
        let primary = emitter.emit_ifd(
            &tables[ExifIfd::PrimaryData.index()],
            &[
                (tags::EXIF_IFD_POINTER, PatchTarget::IfdOffset(ExifIfd::PrivateData)),
                (tags::GPS_IFD_POINTER, PatchTarget::IfdOffset(ExifIfd::GpsInfoData)),
            ],
            primary_trailing,
        );
        let primary_offset = primary.offset;
        let next_image_patch = primary.next_image_patch;
        ifd_offsets[ExifIfd::PrimaryData.index()] = Some(primary.offset);

        if !tables[ExifIfd::PrivateData.index()].is_empty() {
            let offset = self.emit_private_ifd(
                &mut emitter,
                &mut tables[ExifIfd::PrivateData.index()],
                maker_note_original_offset,
            );
            ifd_offsets[ExifIfd::PrivateData.index()] = Some(offset);
        }

        if !tables[ExifIfd::GpsInfoData.index()].is_empty() {
            let gps = emitter.emit_ifd(
                &tables[ExifIfd::GpsInfoData.index()],
                &[],
                TrailingSlot::Zero,
            );
            ifd_offsets[ExifIfd::GpsInfoData.index()] = Some(gps.offset);
        }

        if !tables[ExifIfd::Interoperability.index()].is_empty() {
            let interop = emitter.emit_ifd(
                &tables[ExifIfd::Interoperability.index()],
                &[],
                TrailingSlot::Zero,
            );
            ifd_offsets[ExifIfd::Interoperability.index()] = Some(interop.offset);
        }

        let mut thumbnail_start = None;
        if !tiff_chain {
            let thumbnail_table = &tables[ExifIfd::ThumbnailData.index()];
            if !thumbnail_table.is_empty() || thumbnail.is_some() {
                let emitted = emitter.emit_ifd(
                    thumbnail_table,
                    &[(tags::THUMBNAIL_OFFSET, PatchTarget::ThumbnailStart)],
                    TrailingSlot::Zero,
                );
                ifd_offsets[ExifIfd::ThumbnailData.index()] = Some(emitted.offset);
                if let Some(image) = thumbnail {
                    emitter.align();
                    thumbnail_start = Some(emitter.base + emitter.buffer.len() as u32);
                    emitter.buffer.extend_from_slice(image);
                }
            }
        }

        emitter.resolve_patches(&ifd_offsets, thumbnail_start);
        self.write_back_pointers(tables, &ifd_offsets, thumbnail_start);

        debug!(
            "Serialized tree of {} bytes at base {}",
            emitter.buffer.len(),
            base
        );
        Some(SerializedTree {
            bytes: emitter.buffer,
            primary_offset,
            next_image_patch,
        })
    }

    /// Emits Private Data and compensates maker note movement
    ///
    /// The note's new absolute offset falls out of the emission itself,
    /// so the stage runs once, checks for drift and runs at most once
    /// more after adding the offset schema tag. Fixing only the schema
    /// value does not move anything and is patched into the already
    /// emitted bytes directly.
    fn emit_private_ifd(
        &self,
        emitter: &mut TreeEmitter,
        private: &mut IfdTable,
        maker_note_original_offset: u32,
    ) -> u32 {
        let patch_tags = [(
            tags::INTEROP_IFD_POINTER,
            PatchTarget::IfdOffset(ExifIfd::Interoperability),
        )];
        for pass in 0..2 {
            let checkpoint = emitter.checkpoint();
            let emitted = emitter.emit_ifd(private, &patch_tags, TrailingSlot::Zero);

            let new_offset = match emitted.maker_note_offset {
                Some(offset) if maker_note_original_offset != 0 => offset,
                _ => return emitted.offset,
            };
            let delta = new_offset.wrapping_sub(maker_note_original_offset) as i32;

            match emitted.schema_slot {
                Some(slot) => {
                    // the tag occupies its space already, only the value
                    // needs to change
                    emitter.handler.put_u32(&mut emitter.buffer, slot, delta as u32);
                    if let Some(item) = private.get_mut(tags::OFFSET_SCHEMA) {
                        item.set_type_and_count(TagType::SLong, 1, false);
                        item.write_int_element(0, delta, &*self.handler);
                    }
                    return emitted.offset;
                }
                None if delta == 0 => return emitted.offset,
                None => {
                    if pass == 1 {
                        // the tag was added on the first pass, the slot
                        // must exist now
                        panic!("offset schema slot missing after retry");
                    }
                    debug!(
                        "Maker note moved from {} to {}, adding offset schema tag",
                        maker_note_original_offset, new_offset
                    );
                    let mut item = TagItem::new(tags::OFFSET_SCHEMA, TagType::SLong, 1);
                    item.write_int_element(0, 0, &*self.handler);
                    private.insert(item);
                    emitter.rollback(checkpoint);
                }
            }
        }
        unreachable!("maker note compensation did not converge")
    }

    /// Adds or removes the three child-IFD pointer tags so that each one
    /// exists exactly when its child table has entries
    ///
    /// Private Data is handled first: dropping its interoperability
    /// pointer may empty it, which in turn drops the pointer in Primary.
    fn maintain_pointer_tags(&self, tables: &mut [IfdTable; 5]) {
        let links = [
            (ExifIfd::PrivateData, tags::INTEROP_IFD_POINTER, ExifIfd::Interoperability),
            (ExifIfd::PrimaryData, tags::EXIF_IFD_POINTER, ExifIfd::PrivateData),
            (ExifIfd::PrimaryData, tags::GPS_IFD_POINTER, ExifIfd::GpsInfoData),
        ];
        for (parent, tag_id, child) in links {
            if tables[child.index()].is_empty() {
                tables[parent.index()].remove(tag_id);
            } else {
                let item = tables[parent.index()].entry_or_new(tag_id, TagType::ULong);
                item.set_type_and_count(TagType::ULong, 1, false);
            }
        }
    }

    /// Keeps the thumbnail pointer and length tags in step with the
    /// actual thumbnail image
    fn maintain_thumbnail_tags(&self, tables: &mut [IfdTable; 5], thumbnail: Option<&[u8]>) {
        let table = &mut tables[ExifIfd::ThumbnailData.index()];
        match thumbnail {
            Some(image) => {
                let offset_item = table.entry_or_new(tags::THUMBNAIL_OFFSET, TagType::ULong);
                offset_item.set_type_and_count(TagType::ULong, 1, false);
                let length_item = table.entry_or_new(tags::THUMBNAIL_LENGTH, TagType::ULong);
                length_item.set_type_and_count(TagType::ULong, 1, false);
                length_item.write_uint_element(0, image.len() as u32, &*self.handler);
            }
            None => {
                // without image bytes the placement tags would dangle
                table.remove(tags::THUMBNAIL_OFFSET);
                table.remove(tags::THUMBNAIL_LENGTH);
            }
        }
    }

    /// Mirrors the resolved pointer offsets into the in-memory tags so a
    /// repeated save starts from consistent tables
    fn write_back_pointers(
        &self,
        tables: &mut [IfdTable; 5],
        ifd_offsets: &[Option<u32>; 5],
        thumbnail_start: Option<u32>,
    ) {
        let handler = &*self.handler;
        let links = [
            (ExifIfd::PrimaryData, tags::EXIF_IFD_POINTER, ExifIfd::PrivateData),
            (ExifIfd::PrimaryData, tags::GPS_IFD_POINTER, ExifIfd::GpsInfoData),
            (ExifIfd::PrivateData, tags::INTEROP_IFD_POINTER, ExifIfd::Interoperability),
        ];
        for (parent, tag_id, child) in links {
            if let Some(offset) = ifd_offsets[child.index()] {
                if let Some(item) = tables[parent.index()].get_mut(tag_id) {
                    item.write_uint_element(0, offset, handler);
                }
            }
        }
        if let Some(start) = thumbnail_start {
            if let Some(item) =
                tables[ExifIfd::ThumbnailData.index()].get_mut(tags::THUMBNAIL_OFFSET)
            {
                item.write_uint_element(0, start, handler);
            }
        }
    }
}

struct TreeEmitter<'a> {
    handler: &'a dyn ByteOrderHandler,
    base: u32,
    buffer: Vec<u8>,
    patches: Vec<PatchRequest>,
}

impl<'a> TreeEmitter<'a> {
    /// Pads with one fill byte so the next write starts on a 2-byte
    /// boundary of the absolute offset space
    fn align(&mut self) {
        if (self.base as usize + self.buffer.len()) % 2 == 1 {
            self.buffer.push(0);
        }
    }

    fn checkpoint(&self) -> (usize, usize) {
        (self.buffer.len(), self.patches.len())
    }

    fn rollback(&mut self, checkpoint: (usize, usize)) {
        self.buffer.truncate(checkpoint.0);
        self.patches.truncate(checkpoint.1);
    }

    /// Appends one IFD: entry count, the 12-byte entries, the trailing
    /// slot and the outsourced value region
    ///
    /// Tags listed in `patch_tags` get a patch request instead of their
    /// stored value. Outsourced values follow the entry array in tag id
    /// order, unpadded.
    fn emit_ifd(
        &mut self,
        table: &IfdTable,
        patch_tags: &[(u16, PatchTarget)],
        trailing: TrailingSlot,
    ) -> EmittedIfd {
        self.align();
        let ifd_offset = self.base + self.buffer.len() as u32;

        self.handler.append_u16(&mut self.buffer, table.len() as u16);

        // fix the outsourced region layout up front so entry slots can
        // carry final offsets directly
        let mut running =
            self.buffer.len() + table.len() * limits::IFD_ENTRY_SIZE + 4;
        let mut assigned: Vec<Option<u32>> = Vec::with_capacity(table.len());
        for item in table.iter() {
            if item.is_outsourced() {
                assigned.push(Some(self.base + running as u32));
                running += item.byte_count();
            } else {
                assigned.push(None);
            }
        }

        let mut maker_note_offset = None;
        let mut schema_slot = None;
        for (index, item) in table.iter().enumerate() {
            self.handler.append_u16(&mut self.buffer, item.tag_id());
            self.handler.append_u16(&mut self.buffer, item.tag_type().code());
            self.handler.append_u32(&mut self.buffer, item.value_count());

            let slot = self.buffer.len();
            let patch = patch_tags
                .iter()
                .find(|(id, _)| *id == item.tag_id())
                .map(|(_, target)| *target);
            if let Some(target) = patch {
                self.patches.push(PatchRequest { position: slot, target });
                self.handler.append_u32(&mut self.buffer, 0);
            } else if let Some(offset) = assigned[index] {
                if item.tag_id() == tags::MAKER_NOTE {
                    maker_note_offset = Some(offset);
                }
                self.handler.append_u32(&mut self.buffer, offset);
            } else {
                if item.tag_id() == tags::OFFSET_SCHEMA {
                    schema_slot = Some(slot);
                }
                let bytes = item.value_bytes();
                self.buffer.extend_from_slice(bytes);
                for _ in bytes.len()..4 {
                    self.buffer.push(0);
                }
            }
        }

        let mut next_image_patch = None;
        let trailing_slot = self.buffer.len();
        match trailing {
            TrailingSlot::Zero => self.handler.append_u32(&mut self.buffer, 0),
            TrailingSlot::PatchIfd(kind) => {
                self.patches.push(PatchRequest {
                    position: trailing_slot,
                    target: PatchTarget::IfdOffset(kind),
                });
                self.handler.append_u32(&mut self.buffer, 0);
            }
            TrailingSlot::NextImage => {
                next_image_patch = Some(trailing_slot);
                self.handler.append_u32(&mut self.buffer, 0);
            }
        }

        for item in table.iter() {
            if item.is_outsourced() {
                self.buffer.extend_from_slice(item.value_bytes());
            }
        }

        EmittedIfd {
            offset: ifd_offset,
            maker_note_offset,
            schema_slot,
            next_image_patch,
        }
    }

    /// Second pass: fills every recorded slot with its final offset
    fn resolve_patches(&mut self, ifd_offsets: &[Option<u32>; 5], thumbnail_start: Option<u32>) {
        for patch in &self.patches {
            let value = match patch.target {
                // a pointer to an IFD that was never emitted is written
                // as the end-of-chain marker
                PatchTarget::IfdOffset(kind) => ifd_offsets[kind.index()].unwrap_or(0),
                PatchTarget::ThumbnailStart => thumbnail_start
                    .expect("thumbnail patch request without thumbnail bytes"),
            };
            self.handler.put_u32(&mut self.buffer, patch.position, value);
        }
    }
}
