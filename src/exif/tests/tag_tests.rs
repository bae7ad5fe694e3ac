//! Tests for the tag entry and IFD table module

extern crate std;

use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::exif::tag::{IfdTable, TagItem};
use crate::exif::types::TagType;
use crate::exif::values::ExifRational;
use crate::io::byte_order::LittleEndianHandler;

#[test]
fn test_new_tag_storage_classes() {
    let inline = TagItem::new(0x0112, TagType::UShort, 1);
    std::assert_eq!(inline.byte_count(), 2);
    std::assert!(!inline.is_outsourced());
    std::assert_eq!(inline.value_bytes(), &[0, 0]);

    let outsourced = TagItem::new(0x0132, TagType::Ascii, 20);
    std::assert_eq!(outsourced.byte_count(), 20);
    std::assert!(outsourced.is_outsourced());
    std::assert_eq!(outsourced.original_offset(), 0);
}

#[test]
fn test_from_resident_entry_inline() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(274).unwrap(); // Tag (Orientation)
    buffer.write_u16::<LittleEndian>(3).unwrap();   // Type (USHORT)
    buffer.write_u32::<LittleEndian>(1).unwrap();   // Count
    buffer.write_u32::<LittleEndian>(6).unwrap();   // Value
    let block = Arc::new(buffer);
    let handler = LittleEndianHandler;

    let item = TagItem::from_resident_entry(&block, 0, &handler)
        .unwrap()
        .unwrap();
    std::assert_eq!(item.tag_id(), 274);
    std::assert_eq!(item.tag_type(), TagType::UShort);
    std::assert_eq!(item.value_count(), 1);
    std::assert!(!item.is_outsourced());
    std::assert_eq!(item.read_uint_element(0, &handler), Some(6));
}

#[test]
fn test_from_resident_entry_outsourced() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(315).unwrap(); // Tag (Artist)
    buffer.write_u16::<LittleEndian>(2).unwrap();   // Type (ASCII)
    buffer.write_u32::<LittleEndian>(8).unwrap();   // Count
    buffer.write_u32::<LittleEndian>(12).unwrap();  // Offset
    buffer.extend_from_slice(b"Someone\0");         // Value at offset 12
    let block = Arc::new(buffer);
    let handler = LittleEndianHandler;

    let item = TagItem::from_resident_entry(&block, 0, &handler)
        .unwrap()
        .unwrap();
    std::assert!(item.is_outsourced());
    std::assert_eq!(item.original_offset(), 12);
    std::assert_eq!(item.value_bytes(), b"Someone\0");
}

#[test]
fn test_from_resident_entry_rejects_bad_entries() {
    let handler = LittleEndianHandler;

    // Value range reaching past the block
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(315).unwrap();
    buffer.write_u16::<LittleEndian>(2).unwrap();
    buffer.write_u32::<LittleEndian>(100).unwrap(); // Count way too large
    buffer.write_u32::<LittleEndian>(12).unwrap();
    let block = Arc::new(buffer);
    std::assert!(TagItem::from_resident_entry(&block, 0, &handler).is_err());

    // Entry running off the end of the block
    let short_block = Arc::new(vec![0u8; 10]);
    std::assert!(TagItem::from_resident_entry(&short_block, 0, &handler).is_err());
}

#[test]
fn test_from_resident_entry_skips_unknown_type() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(274).unwrap();
    buffer.write_u16::<LittleEndian>(99).unwrap(); // No such field type
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(6).unwrap();
    let block = Arc::new(buffer);
    let handler = LittleEndianHandler;

    let item = TagItem::from_resident_entry(&block, 0, &handler).unwrap();
    std::assert!(item.is_none());
}

#[test]
fn test_from_stream_entry_reads_value_from_stream() {
    let handler = LittleEndianHandler;

    // The entry array and the value region live apart in a TIFF file
    let mut entries = Vec::new();
    entries.write_u16::<LittleEndian>(700).unwrap(); // Tag
    entries.write_u16::<LittleEndian>(1).unwrap();   // Type (BYTE)
    entries.write_u32::<LittleEndian>(8).unwrap();   // Count
    entries.write_u32::<LittleEndian>(20).unwrap();  // Offset in the file

    let mut file = vec![0u8; 20];
    file.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let file_len = file.len() as u64;
    let mut cursor = Cursor::new(file);

    let item = TagItem::from_stream_entry(&entries, 0, &mut cursor, file_len, &handler)
        .unwrap()
        .unwrap();
    std::assert_eq!(item.value_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    std::assert_eq!(item.original_offset(), 20);

    // The same entry against a shorter stream is rejected
    let mut short = Cursor::new(vec![0u8; 24]);
    std::assert!(TagItem::from_stream_entry(&entries, 0, &mut short, 24, &handler).is_err());
}

#[test]
fn test_uint_element_access() {
    let handler = LittleEndianHandler;
    let mut item = TagItem::new(0x0100, TagType::UShort, 2);

    std::assert!(item.write_uint_element(0, 0x1234, &handler));
    std::assert!(item.write_uint_element(1, 0xABCD, &handler));
    std::assert_eq!(item.read_uint_element(0, &handler), Some(0x1234));
    std::assert_eq!(item.read_uint_element(1, &handler), Some(0xABCD));
    std::assert_eq!(item.read_uint_element(2, &handler), None);
}

#[test]
fn test_uint_write_extends_count() {
    let handler = LittleEndianHandler;
    let mut item = TagItem::new(0x0111, TagType::UShort, 1);
    item.write_uint_element(0, 42, &handler);

    // Writing past the end grows the tag, keeping earlier elements
    std::assert!(item.write_uint_element(2, 7, &handler));
    std::assert_eq!(item.value_count(), 3);
    std::assert_eq!(item.read_uint_element(0, &handler), Some(42));
    std::assert_eq!(item.read_uint_element(1, &handler), Some(0));
    std::assert_eq!(item.read_uint_element(2, &handler), Some(7));
}

#[test]
fn test_element_access_type_checks() {
    let handler = LittleEndianHandler;

    let mut ushort = TagItem::new(1, TagType::UShort, 1);
    std::assert!(!ushort.write_int_element(0, -1, &handler));
    std::assert!(!ushort.write_rational_element(0, ExifRational::new(1, 2), &handler));
    std::assert!(!ushort.write_double_element(0, 1.0, &handler));

    let mut rational = TagItem::new(2, TagType::SRational, 1);
    std::assert!(!rational.write_uint_element(0, 1, &handler));
    std::assert_eq!(rational.read_uint_element(0, &handler), None);
}

#[test]
fn test_int_element_access() {
    let handler = LittleEndianHandler;
    let mut item = TagItem::new(0xEA1D, TagType::SLong, 1);

    std::assert!(item.write_int_element(0, -40, &handler));
    std::assert_eq!(item.read_int_element(0, &handler), Some(-40));

    // Unsigned types read as signed while the value fits
    let mut wide = TagItem::new(1, TagType::ULong, 1);
    wide.write_uint_element(0, 0x7FFF_FFFF, &handler);
    std::assert_eq!(wide.read_int_element(0, &handler), Some(i32::MAX));
    wide.write_uint_element(0, 0x8000_0000, &handler);
    std::assert_eq!(wide.read_int_element(0, &handler), None);
}

#[test]
fn test_rational_element_access() {
    let handler = LittleEndianHandler;

    let mut unsigned = TagItem::new(0x0002, TagType::URational, 1);
    std::assert!(unsigned.write_rational_element(0, ExifRational::new(1, 3), &handler));
    std::assert_eq!(
        unsigned.read_rational_element(0, &handler),
        Some(ExifRational::new(1, 3))
    );

    let mut signed = TagItem::new(0x0003, TagType::SRational, 1);
    std::assert!(signed.write_rational_element(
        0,
        ExifRational::new_signed(-1, 2),
        &handler
    ));
    let value = signed.read_rational_element(0, &handler).unwrap();
    std::assert!(value.negative);
    std::assert_eq!(value.to_decimal(), -0.5);

    // An unsigned slot stores the magnitude only
    unsigned.write_rational_element(0, ExifRational::new_signed(-3, 4), &handler);
    let magnitude = unsigned.read_rational_element(0, &handler).unwrap();
    std::assert!(!magnitude.negative);
    std::assert_eq!(magnitude.to_decimal(), 0.75);
}

#[test]
fn test_double_element_access() {
    let handler = LittleEndianHandler;

    let mut float = TagItem::new(1, TagType::Float, 1);
    std::assert!(float.write_double_element(0, 1.5, &handler));
    std::assert_eq!(float.read_double_element(0, &handler), Some(1.5));
    std::assert!(!float.is_outsourced());

    let mut double = TagItem::new(2, TagType::Double, 1);
    std::assert!(double.write_double_element(0, 2.25, &handler));
    std::assert_eq!(double.read_double_element(0, &handler), Some(2.25));
    std::assert!(double.is_outsourced());
}

#[test]
fn test_set_raw() {
    let mut item = TagItem::new(0x013B, TagType::Ascii, 0);
    item.set_raw(TagType::Ascii, 6, b"Hello\0");
    std::assert_eq!(item.value_count(), 6);
    std::assert_eq!(item.value_bytes(), b"Hello\0");

    // Shorter input zero-fills the remaining slot bytes
    item.set_raw(TagType::Ascii, 4, b"Ab");
    std::assert_eq!(item.value_bytes(), &[b'A', b'b', 0, 0]);
}

#[test]
fn test_borrowed_value_promotion() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(315).unwrap();
    buffer.write_u16::<LittleEndian>(2).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();
    buffer.write_u32::<LittleEndian>(12).unwrap();
    buffer.extend_from_slice(b"Someone\0");
    let block = Arc::new(buffer);
    let handler = LittleEndianHandler;

    let mut item = TagItem::from_resident_entry(&block, 0, &handler)
        .unwrap()
        .unwrap();

    // Mutation copies the value out of the shared block first
    item.value_bytes_mut()[0] = b'X';
    std::assert_eq!(item.value_bytes()[0], b'X');
    std::assert_eq!(block[12], b'S');
}

#[test]
fn test_swap_byte_order() {
    let mut shorts = TagItem::new(1, TagType::UShort, 2);
    shorts.set_raw(TagType::UShort, 2, &[0x12, 0x34, 0x56, 0x78]);
    shorts.swap_byte_order();
    std::assert_eq!(shorts.value_bytes(), &[0x34, 0x12, 0x78, 0x56]);

    // Rationals swap their two halves independently
    let mut rational = TagItem::new(2, TagType::URational, 1);
    rational.set_raw(TagType::URational, 1, &[1, 2, 3, 4, 5, 6, 7, 8]);
    rational.swap_byte_order();
    std::assert_eq!(rational.value_bytes(), &[4, 3, 2, 1, 8, 7, 6, 5]);

    // Byte-wide content is unaffected
    let mut text = TagItem::new(3, TagType::Ascii, 3);
    text.set_raw(TagType::Ascii, 3, b"ab\0");
    text.swap_byte_order();
    std::assert_eq!(text.value_bytes(), b"ab\0");
}

#[test]
fn test_tag_display() {
    let item = TagItem::new(0x0112, TagType::UShort, 1);
    std::assert_eq!(
        item.to_string(),
        "Tag 0x0112, Type: USHORT, Count: 1, Bytes: 2"
    );
}

#[test]
fn test_table_insert_and_lookup() {
    let mut table = IfdTable::new();
    std::assert!(table.is_empty());

    table.insert(TagItem::new(5, TagType::UShort, 1));
    table.insert(TagItem::new(1, TagType::ULong, 1));
    table.insert(TagItem::new(3, TagType::Ascii, 4));
    std::assert_eq!(table.len(), 3);
    std::assert!(table.contains(3));
    std::assert!(!table.contains(4));

    // Ids come back in ascending order
    std::assert_eq!(table.tag_ids(), vec![1, 3, 5]);
    let iterated: Vec<u16> = table.iter().map(|item| item.tag_id()).collect();
    std::assert_eq!(iterated, vec![1, 3, 5]);
}

#[test]
fn test_table_insert_replaces() {
    let mut table = IfdTable::new();
    table.insert(TagItem::new(1, TagType::UShort, 1));
    table.insert(TagItem::new(1, TagType::ULong, 1));
    std::assert_eq!(table.len(), 1);
    std::assert_eq!(table.get(1).unwrap().tag_type(), TagType::ULong);
}

#[test]
fn test_table_insert_if_absent_keeps_first() {
    let mut table = IfdTable::new();
    std::assert!(table.insert_if_absent(TagItem::new(1, TagType::UShort, 1)));
    std::assert!(!table.insert_if_absent(TagItem::new(1, TagType::ULong, 1)));
    std::assert_eq!(table.get(1).unwrap().tag_type(), TagType::UShort);
}

#[test]
fn test_table_entry_or_new() {
    let mut table = IfdTable::new();
    let item = table.entry_or_new(7, TagType::Ascii);
    std::assert_eq!(item.value_count(), 0);
    item.set_raw(TagType::Ascii, 3, b"ab\0");

    // A second call returns the existing tag
    let again = table.entry_or_new(7, TagType::UShort);
    std::assert_eq!(again.tag_type(), TagType::Ascii);
    std::assert_eq!(table.len(), 1);
}

#[test]
fn test_table_remove_and_retain() {
    let mut table = IfdTable::new();
    for id in [1u16, 2, 3, 4] {
        table.insert(TagItem::new(id, TagType::UShort, 1));
    }

    std::assert!(table.remove(2));
    std::assert!(!table.remove(2));

    table.retain(|id, _| id % 2 == 1);
    std::assert_eq!(table.tag_ids(), vec![1, 3]);

    table.clear();
    std::assert!(table.is_empty());
}
