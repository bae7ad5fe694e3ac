use byteorder::{LittleEndian, WriteBytesExt};

use crate::exif::constants::tags;

/// Creates a minimal little-endian EXIF block: one Primary IFD holding
/// an inline Orientation tag
pub fn minimal_exif_block() -> Vec<u8> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Primary IFD (at offset 8): 2 + 1*12 + 4 = 18 bytes
    buffer.write_u16::<LittleEndian>(1).unwrap();      // Entry count
    buffer.write_u16::<LittleEndian>(274).unwrap();    // Tag (Orientation)
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Type (USHORT)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(6).unwrap();      // Value
    buffer.write_u32::<LittleEndian>(0).unwrap();      // No next IFD

    buffer
}

/// Appends a tagged JPEG segment: marker, length field, payload
pub fn push_segment(buffer: &mut Vec<u8>, marker: u16, payload: &[u8]) {
    buffer.extend_from_slice(&marker.to_be_bytes());
    buffer.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
    buffer.extend_from_slice(payload);
}

/// Creates a JPEG carrying every metadata block kind the scanner knows
///
/// Segment order: SOI, APP0 (JFIF), EXIF APP1, XMP APP1, IPTC APP13,
/// COM, then SOS with two bytes of entropy data and EOI.
pub fn create_full_jpeg(exif_block: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0xFF, 0xD8]); // SOI

    push_segment(&mut buffer, 0xFFE0, b"JFIF\0\x01\x02");

    let mut exif_payload = Vec::from(&b"Exif\0\0"[..]);
    exif_payload.extend_from_slice(exif_block);
    push_segment(&mut buffer, 0xFFE1, &exif_payload);

    let mut xmp_payload = Vec::from(&b"http://ns.adobe.com/xap/1.0/\0"[..]);
    xmp_payload.extend_from_slice(b"<x:xmpmeta/>");
    push_segment(&mut buffer, 0xFFE1, &xmp_payload);

    let mut iptc_payload = Vec::from(&b"Photoshop 3.0\0"[..]);
    iptc_payload.extend_from_slice(&[0x38, 0x42, 0x49, 0x4D]);
    push_segment(&mut buffer, 0xFFED, &iptc_payload);

    push_segment(&mut buffer, 0xFFFE, b"A comment");

    buffer.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]); // SOS
    buffer.extend_from_slice(&[0x12, 0x34]);             // Entropy data
    buffer.extend_from_slice(&[0xFF, 0xD9]);             // EOI
    buffer
}

/// Creates a JPEG with no metadata segments at all
pub fn create_plain_jpeg() -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0xFF, 0xD8]); // SOI
    buffer.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]); // SOS
    buffer.extend_from_slice(&[0x12, 0x34]);
    buffer.extend_from_slice(&[0xFF, 0xD9]); // EOI
    buffer
}

/// Computes the CRC a PNG chunk carries, over type and payload
pub fn png_crc(chunk_type: &[u8; 4], payload: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(chunk_type);
    crc.update(payload);
    crc.sum()
}

/// Appends one PNG chunk with a freshly computed CRC
pub fn push_png_chunk(buffer: &mut Vec<u8>, chunk_type: &[u8; 4], payload: &[u8]) {
    buffer.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buffer.extend_from_slice(chunk_type);
    buffer.extend_from_slice(payload);
    buffer.extend_from_slice(&png_crc(chunk_type, payload).to_be_bytes());
}

/// Creates a PNG carrying every metadata chunk kind the scanner knows
///
/// Chunk order: IHDR, eXIf, XMP iTXt, IPTC iTXt, tEXt, tIME, IDAT, IEND.
pub fn create_full_png(exif_block: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

    // IHDR: 1x1 pixel, 8-bit grayscale
    let ihdr = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
    push_png_chunk(&mut buffer, b"IHDR", &ihdr);
    push_png_chunk(&mut buffer, b"eXIf", exif_block);

    let mut xmp = Vec::from(&b"XML:com.adobe.xmp\0"[..]);
    xmp.extend_from_slice(b"\0\0\0\0<x:xmpmeta/>");
    push_png_chunk(&mut buffer, b"iTXt", &xmp);

    let mut iptc = Vec::from(&b"Raw profile type iptc\0"[..]);
    iptc.extend_from_slice(b"\0\0\0\0profile");
    push_png_chunk(&mut buffer, b"iTXt", &iptc);

    push_png_chunk(&mut buffer, b"tEXt", b"Comment\0Hello");
    push_png_chunk(&mut buffer, b"tIME", &[0x07, 0xE4, 1, 2, 3, 4, 5]);
    push_png_chunk(&mut buffer, b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]);
    push_png_chunk(&mut buffer, b"IEND", &[]);
    buffer
}

/// Creates a little-endian TIFF with two chained images
///
/// Image 1: 4-entry IFD at offset 8 with a 2-byte strip at 62, chained
/// to image 2. Image 2: 2-entry IFD at offset 64 with a 2-byte strip
/// at 94.
pub fn create_two_page_tiff() -> Vec<u8> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // First IFD (at offset 8): 2 + 4*12 + 4 = 54 bytes, ends at 62
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag (ImageWidth)
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Value

    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag (ImageLength)
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Value

    buffer.write_u16::<LittleEndian>(tags::STRIP_OFFSETS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(62).unwrap();     // Strip at offset 62

    buffer.write_u16::<LittleEndian>(tags::STRIP_BYTE_COUNTS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(2).unwrap();      // Strip is 2 bytes

    buffer.write_u32::<LittleEndian>(64).unwrap();     // Next IFD: image 2

    // Strip of image 1 (at offset 62, 2 bytes)
    buffer.extend_from_slice(&[0xAA, 0xBB]);

    // Second IFD (at offset 64): 2 + 2*12 + 4 = 30 bytes, ends at 94
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(tags::STRIP_OFFSETS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(94).unwrap();     // Strip at offset 94

    buffer.write_u16::<LittleEndian>(tags::STRIP_BYTE_COUNTS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(2).unwrap();      // Strip is 2 bytes

    buffer.write_u32::<LittleEndian>(0).unwrap();      // End of the chain

    // Strip of image 2 (at offset 94, 2 bytes)
    buffer.extend_from_slice(&[0xCC, 0xDD]);

    buffer
}
