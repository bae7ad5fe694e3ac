//! Integration tests for the metadata codec
//!
//! Every test drives the public API end to end: an image file is built
//! in a temporary directory, its metadata gets reworked, and the saved
//! result is loaded again for verification.

extern crate std;

use std::fs;

use exifkit::exif::constants::tags;
use exifkit::{
    ExifData, ExifDateTime, ExifError, ExifIfd, ExifKit, GeoCoordinate, ImageFileBlock,
    StrCoding, TagType,
};

/// Appends a tagged JPEG segment: marker, length field, payload
fn push_segment(buffer: &mut Vec<u8>, marker: u16, payload: &[u8]) {
    buffer.extend_from_slice(&marker.to_be_bytes());
    buffer.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
    buffer.extend_from_slice(payload);
}

/// Creates a JPEG carrying the given EXIF block and optionally an XMP packet
fn create_jpeg(exif_block: Option<&[u8]>, with_xmp: bool) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0xFF, 0xD8]); // SOI
    push_segment(&mut buffer, 0xFFE0, b"JFIF\0\x01\x02");
    if let Some(block) = exif_block {
        let mut payload = Vec::from(&b"Exif\0\0"[..]);
        payload.extend_from_slice(block);
        push_segment(&mut buffer, 0xFFE1, &payload);
    }
    if with_xmp {
        let mut payload = Vec::from(&b"http://ns.adobe.com/xap/1.0/\0"[..]);
        payload.extend_from_slice(b"<x:xmpmeta/>");
        push_segment(&mut buffer, 0xFFE1, &payload);
    }
    buffer.extend_from_slice(&[0xFF, 0xDA]); // SOS
    buffer.extend_from_slice(&[0x00, 0x02]); // Scan header length
    buffer.extend_from_slice(&[0x12, 0x34]); // Entropy coded data
    buffer.extend_from_slice(&[0xFF, 0xD9]); // EOI
    buffer
}

/// Appends one PNG chunk with its CRC over type and payload
fn push_png_chunk(buffer: &mut Vec<u8>, chunk_type: &[u8; 4], payload: &[u8]) {
    let mut crc = flate2::Crc::new();
    crc.update(chunk_type);
    crc.update(payload);
    buffer.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buffer.extend_from_slice(chunk_type);
    buffer.extend_from_slice(payload);
    buffer.extend_from_slice(&crc.sum().to_be_bytes());
}

/// Creates a PNG whose eXIf chunk carries the given block
fn create_png(exif_block: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::from(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A][..]);
    push_png_chunk(&mut buffer, b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]);
    push_png_chunk(&mut buffer, b"eXIf", exif_block);
    push_png_chunk(&mut buffer, b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]);
    push_png_chunk(&mut buffer, b"IEND", &[]);
    buffer
}

/// Creates a little-endian EXIF block holding a single Orientation tag
fn create_minimal_block() -> Vec<u8> {
    let mut buffer = Vec::new();

    // TIFF header
    buffer.extend_from_slice(&[0x49, 0x49]); // "II" for little-endian
    buffer.extend_from_slice(&[42, 0]);      // TIFF magic number
    buffer.extend_from_slice(&[8, 0, 0, 0]); // Offset to first IFD

    // Primary IFD (at offset 8)
    buffer.extend_from_slice(&[1, 0]);       // Number of entries
    buffer.extend_from_slice(&[0x12, 0x01]); // Tag (Orientation)
    buffer.extend_from_slice(&[3, 0]);       // Type (USHORT)
    buffer.extend_from_slice(&[1, 0, 0, 0]); // Count
    buffer.extend_from_slice(&[6, 0, 0, 0]); // Value
    buffer.extend_from_slice(&[0, 0, 0, 0]); // No next IFD

    buffer
}

/// Creates a little-endian EXIF block whose Private Data IFD carries an
/// outsourced maker note at offset 44
fn create_maker_note_block() -> Vec<u8> {
    let mut buffer = Vec::new();

    // TIFF header
    buffer.extend_from_slice(&[0x49, 0x49]);  // "II" for little-endian
    buffer.extend_from_slice(&[42, 0]);       // TIFF magic number
    buffer.extend_from_slice(&[8, 0, 0, 0]);  // Offset to first IFD

    // Primary IFD (at offset 8): one pointer entry, ends at 26
    buffer.extend_from_slice(&[1, 0]);        // Number of entries
    buffer.extend_from_slice(&[0x69, 0x87]);  // Tag (ExifIfdPointer)
    buffer.extend_from_slice(&[4, 0]);        // Type (ULONG)
    buffer.extend_from_slice(&[1, 0, 0, 0]);  // Count
    buffer.extend_from_slice(&[26, 0, 0, 0]); // Private Data IFD offset
    buffer.extend_from_slice(&[0, 0, 0, 0]);  // No next IFD

    // Private Data IFD (at offset 26): the maker note, ends at 44
    buffer.extend_from_slice(&[1, 0]);        // Number of entries
    buffer.extend_from_slice(&[0x7C, 0x92]);  // Tag (MakerNote)
    buffer.extend_from_slice(&[7, 0]);        // Type (UNDEFINED)
    buffer.extend_from_slice(&[8, 0, 0, 0]);  // Count
    buffer.extend_from_slice(&[44, 0, 0, 0]); // Value offset
    buffer.extend_from_slice(&[0, 0, 0, 0]);  // No next IFD

    buffer.extend_from_slice(b"NoteData");    // Maker note payload
    buffer
}

#[test]
fn test_jpeg_date_taken_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    fs::write(&path, create_jpeg(None, false)).unwrap();

    let mut data = ExifData::from_file(&path).unwrap();
    std::assert!(data.date_taken().is_none());
    let mut date = ExifDateTime::new(2023, 8, 14, 20, 15, 10);
    date.millisecond = 250;
    data.set_date_taken(&date);
    let output = dir.path().join("tagged.jpg");
    data.save_as(&output).unwrap();

    let reloaded = ExifData::from_file(&output).unwrap();
    std::assert_eq!(reloaded.date_taken(), Some(date));
    // the fraction travels in its own companion tag
    std::assert_eq!(
        reloaded.tag_string(
            ExifIfd::PrivateData,
            tags::SUB_SEC_TIME_ORIGINAL,
            StrCoding::ascii()
        ),
        Some("250".to_string())
    );
}

#[test]
fn test_jpeg_gps_position_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    fs::write(&path, create_jpeg(None, false)).unwrap();

    let mut data = ExifData::from_file(&path).unwrap();
    std::assert!(data.set_gps_latitude(&GeoCoordinate::from_decimal(51.501234, true)));
    std::assert!(data.set_gps_longitude(&GeoCoordinate::from_decimal(-0.123456, false)));
    let output = dir.path().join("located.jpg");
    data.save_as(&output).unwrap();

    let reloaded = ExifData::from_file(&output).unwrap();
    let latitude = reloaded.gps_latitude().unwrap();
    let longitude = reloaded.gps_longitude().unwrap();
    std::assert_eq!(latitude.cardinal, 'N');
    std::assert_eq!(longitude.cardinal, 'W');
    // seconds keep two decimals, the position stays within an arc-second
    std::assert!((latitude.to_decimal() - 51.501234).abs() < 1.0 / 3600.0);
    std::assert!((longitude.to_decimal() + 0.123456).abs() < 1.0 / 3600.0);
}

#[test]
fn test_maker_note_keeps_its_bytes_when_shifted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera.jpg");
    fs::write(&path, create_jpeg(Some(&create_maker_note_block()), false)).unwrap();

    // inserting the capture date shifts every value stored behind it
    let mut data = ExifData::from_file(&path).unwrap();
    data.set_date_taken(&ExifDateTime::new(2024, 2, 29, 12, 0, 0));
    let output = dir.path().join("dated.jpg");
    data.save_as(&output).unwrap();

    let reloaded = ExifData::from_file(&output).unwrap();
    let (tag_type, count, bytes) = reloaded
        .tag_raw(ExifIfd::PrivateData, tags::MAKER_NOTE)
        .unwrap();
    std::assert_eq!(tag_type, TagType::Undefined);
    std::assert_eq!(count, 8);
    std::assert_eq!(bytes, b"NoteData");
    // the offset schema tag records how far the note moved
    std::assert!(reloaded.tag_exists(ExifIfd::PrivateData, tags::OFFSET_SCHEMA));

    // a second rewrite reproduces the file byte for byte
    let mut second = ExifData::from_file(&output).unwrap();
    let stable = dir.path().join("stable.jpg");
    second.save_as(&stable).unwrap();
    std::assert_eq!(fs::read(&output).unwrap(), fs::read(&stable).unwrap());
}

#[test]
fn test_png_with_corrupted_exif_crc_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    let mut image = create_png(&create_minimal_block());
    // signature (8), IHDR chunk (25) and the eXIf chunk header put the
    // CRC right behind the 26 payload bytes
    image[33 + 8 + 26] ^= 0xFF;
    fs::write(&path, image).unwrap();

    std::assert!(matches!(
        ExifData::from_file(&path),
        Err(ExifError::ImageStructure(_))
    ));
}

#[test]
fn test_removing_xmp_keeps_exif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    fs::write(&path, create_jpeg(Some(&create_minimal_block()), true)).unwrap();

    let mut data = ExifData::from_file(&path).unwrap();
    std::assert!(data.image_file_block_exists(ImageFileBlock::Xmp));
    data.remove_image_file_block(ImageFileBlock::Xmp);
    let output = dir.path().join("cleaned.jpg");
    data.save_as(&output).unwrap();

    let reloaded = ExifData::from_file(&output).unwrap();
    std::assert!(!reloaded.image_file_block_exists(ImageFileBlock::Xmp));
    std::assert!(reloaded.image_file_block_exists(ImageFileBlock::Exif));
    std::assert_eq!(reloaded.tag_uint(ExifIfd::PrimaryData, 0x0112, 0), Some(6));
}

#[test]
fn test_facade_date_workflow() {
    let kit = ExifKit::new(None).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    fs::write(&path, create_jpeg(None, false)).unwrap();
    let input = path.to_str().unwrap();

    std::assert_eq!(kit.date_taken(input).unwrap(), None);
    kit.set_date_taken(input, None, "2022:05:06 07:08:09").unwrap();
    std::assert_eq!(
        kit.date_taken(input).unwrap(),
        Some("2022:05:06 07:08:09".to_string())
    );

    let analysis = kit.analyze(input).unwrap();
    std::assert!(analysis.contains("Format: JPEG"));
    std::assert!(analysis.contains("Private Data IFD"));
}
