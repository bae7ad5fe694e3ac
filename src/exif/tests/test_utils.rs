use byteorder::{LittleEndian, WriteBytesExt};

use crate::exif::constants::tags;

/// Creates a little-endian EXIF block with a Primary and a Private IFD
///
/// Layout: header at 0, Primary IFD at 8 with DateTime (ASCII, outsourced),
/// Orientation (USHORT, inline) and the Private Data pointer; the Private
/// IFD follows with an inline ISO speed tag.
pub fn create_le_exif_block() -> Vec<u8> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Primary IFD (at offset 8): 2 + 3*12 + 4 = 42 bytes, ends at 50
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Entry count

    // Entry 1: Orientation (tag 274), inline
    buffer.write_u16::<LittleEndian>(274).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Type (USHORT)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(6).unwrap();      // Value (rotate 90)

    // Entry 2: DateTime (tag 306), outsourced to offset 50
    buffer.write_u16::<LittleEndian>(306).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Type (ASCII)
    buffer.write_u32::<LittleEndian>(20).unwrap();     // Count
    buffer.write_u32::<LittleEndian>(50).unwrap();     // Offset

    // Entry 3: Private Data pointer (tag 0x8769) to offset 70
    buffer.write_u16::<LittleEndian>(tags::EXIF_IFD_POINTER).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(70).unwrap();     // Offset of the IFD

    // Next IFD offset (0 = no thumbnail IFD)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    // Outsourced DateTime value (at offset 50, 20 bytes)
    buffer.extend_from_slice(b"2020:01:02 03:04:05\0");

    // Private IFD (at offset 70): 1 entry
    buffer.write_u16::<LittleEndian>(1).unwrap();      // Entry count

    // Entry 1: PhotographicSensitivity (tag 0x8827), inline
    buffer.write_u16::<LittleEndian>(0x8827).unwrap(); // Tag
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Type (USHORT)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(400).unwrap();    // Value (ISO 400)

    // Next IFD offset
    buffer.write_u32::<LittleEndian>(0).unwrap();

    buffer
}

/// Wraps an EXIF block into a minimal JPEG stream
///
/// The image is SOI, APP1 with the EXIF signature, SOS, two bytes of
/// entropy data and EOI. Passing None yields a JPEG without metadata.
pub fn create_jpeg(exif_block: Option<&[u8]>) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0xFF, 0xD8]); // SOI

    if let Some(block) = exif_block {
        let length = (2 + 6 + block.len()) as u16;
        buffer.extend_from_slice(&[0xFF, 0xE1]); // APP1
        buffer.extend_from_slice(&length.to_be_bytes());
        buffer.extend_from_slice(b"Exif\0\0");
        buffer.extend_from_slice(block);
    }

    // SOS with a minimal header, then entropy data until EOI
    buffer.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
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

/// Wraps an EXIF block into a minimal PNG stream
///
/// The image is the signature, IHDR, the optional eXIf chunk, one IDAT
/// chunk and IEND, all with valid CRCs.
pub fn create_png(exif_block: Option<&[u8]>) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

    // IHDR: 1x1 pixel, 8-bit grayscale
    let ihdr = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
    push_png_chunk(&mut buffer, b"IHDR", &ihdr);

    if let Some(block) = exif_block {
        push_png_chunk(&mut buffer, b"eXIf", block);
    }

    push_png_chunk(&mut buffer, b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]);
    push_png_chunk(&mut buffer, b"IEND", &[]);
    buffer
}

/// Creates a little-endian TIFF file with one image
///
/// The Primary IFD carries the geometry tags, a single strip of pixel
/// data and an Artist tag so there is some metadata to work on.
pub fn create_le_tiff() -> Vec<u8> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Primary IFD (at offset 8): 2 + 7*12 + 4 = 90 bytes, ends at 98
    buffer.write_u16::<LittleEndian>(7).unwrap();      // Entry count

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(2).unwrap();      // Value (width)

    // Entry 2: ImageLength (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(2).unwrap();      // Value (height)

    // Entry 3: Compression (tag 259), 1 = uncompressed
    buffer.write_u16::<LittleEndian>(259).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Type (USHORT)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Value

    // Entry 4: StripOffsets (tag 0x0111), strip at offset 106
    buffer.write_u16::<LittleEndian>(tags::STRIP_OFFSETS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(106).unwrap();    // Offset of the strip

    // Entry 5: RowsPerStrip (tag 278)
    buffer.write_u16::<LittleEndian>(278).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(2).unwrap();      // Value

    // Entry 6: StripByteCounts (tag 0x0117)
    buffer.write_u16::<LittleEndian>(tags::STRIP_BYTE_COUNTS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (ULONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(4).unwrap();      // Strip is 4 bytes

    // Entry 7: Artist (tag 315), outsourced to offset 98
    buffer.write_u16::<LittleEndian>(315).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Type (ASCII)
    buffer.write_u32::<LittleEndian>(8).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(98).unwrap();     // Offset

    // Next IFD offset (0 = single page)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    // Outsourced Artist value (at offset 98, 8 bytes)
    buffer.extend_from_slice(b"Someone\0");

    // Strip data (at offset 106, 4 bytes)
    buffer.extend_from_slice(&[0x11, 0x22, 0x33, 0x44]);

    buffer
}
