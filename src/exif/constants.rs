//! EXIF format constants
//!
//! This module defines constants used throughout the EXIF processing code,
//! making the code more readable and maintainable by replacing magic numbers
//! with descriptive names.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// "MM" byte order marker for big-endian
    pub const BIG_ENDIAN_MARKER: [u8; 2] = [0x4D, 0x4D];

    /// Full TIFF header length: marker + version + first IFD offset
    pub const LENGTH: usize = 8;
}

/// JPEG segment markers
pub mod jpeg {
    pub const SOI: u16 = 0xFFD8;  // Start of image
    pub const EOI: u16 = 0xFFD9;  // End of image
    pub const SOS: u16 = 0xFFDA;  // Start of scan, image data follows
    pub const APP0: u16 = 0xFFE0; // JFIF application segment
    pub const APP1: u16 = 0xFFE1; // EXIF or XMP application segment
    pub const APP13: u16 = 0xFFED; // Photoshop/IPTC application segment
    pub const COM: u16 = 0xFFFE;  // Comment segment
    pub const TEM: u16 = 0xFF01;  // Temporary marker, no payload

    /// First of the restart markers (0xFFD0..=0xFFD7 plus EOI carry no payload)
    pub const RST0: u16 = 0xFFD0;

    /// Signature at the start of an EXIF APP1 payload
    pub const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";

    /// Signature at the start of an XMP APP1 payload
    pub const XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

    /// Signature at the start of a Photoshop APP13 payload
    pub const IPTC_SIGNATURE: &[u8] = b"Photoshop 3.0\0";

    /// Largest EXIF IFD tree that fits a single APP1 segment:
    /// 65534 minus length field (2), EXIF signature (6) and TIFF header (8)
    pub const MAX_EXIF_TREE_SIZE: usize = 65518;
}

/// PNG chunk framing
pub mod png {
    /// Fixed 8-byte file signature
    pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    pub const IHDR: [u8; 4] = *b"IHDR"; // Image header, always the first chunk
    pub const IEND: [u8; 4] = *b"IEND"; // Image trailer, always the last chunk
    pub const EXIF: [u8; 4] = *b"eXIf"; // EXIF block chunk
    pub const ITXT: [u8; 4] = *b"iTXt"; // International text, carries XMP/IPTC
    pub const TEXT: [u8; 4] = *b"tEXt"; // Latin-1 text chunk
    pub const TIME: [u8; 4] = *b"tIME"; // Last modification time chunk

    /// Keyword opening an XMP iTXt chunk
    pub const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp\0";

    /// Keyword opening an IPTC iTXt chunk
    pub const IPTC_KEYWORD: &[u8] = b"Raw profile type iptc\0";
}

/// Field types as defined in the TIFF spec
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const USHORT: u16 = 3;     // 16-bit unsigned integer
    pub const ULONG: u16 = 4;      // 32-bit unsigned integer
    pub const URATIONAL: u16 = 5;  // Two ULONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point

    /// Byte width per field type, indexed by type code 0..=12
    pub const SIZES: [u32; 13] = [0, 1, 1, 2, 4, 8, 1, 1, 2, 4, 8, 4, 8];
}

/// Tag ids the codec itself cares about
pub mod tags {
    // IFD pointer tags in Primary and Private Data
    pub const EXIF_IFD_POINTER: u16 = 0x8769;    // Primary -> Private Data IFD
    pub const GPS_IFD_POINTER: u16 = 0x8825;     // Primary -> GPS Info IFD
    pub const INTEROP_IFD_POINTER: u16 = 0xA005; // Private -> Interoperability IFD

    // Thumbnail placement tags in Thumbnail Data
    pub const THUMBNAIL_OFFSET: u16 = 0x0201; // JpegInterchangeFormat
    pub const THUMBNAIL_LENGTH: u16 = 0x0202; // JpegInterchangeFormatLength

    // Maker note handling
    pub const MAKER_NOTE: u16 = 0x927C;    // Vendor specific opaque payload
    pub const OFFSET_SCHEMA: u16 = 0xEA1D; // Signed shift of the maker note offset

    // Date/time tags with their sub-second companions
    pub const DATE_TIME: u16 = 0x0132;               // Modification date, Primary Data
    pub const SUB_SEC_TIME: u16 = 0x9290;            // Fraction for DATE_TIME
    pub const DATE_TIME_ORIGINAL: u16 = 0x9003;      // Capture date, Private Data
    pub const SUB_SEC_TIME_ORIGINAL: u16 = 0x9291;   // Fraction for DATE_TIME_ORIGINAL
    pub const DATE_TIME_DIGITIZED: u16 = 0x9004;     // Digitization date, Private Data
    pub const SUB_SEC_TIME_DIGITIZED: u16 = 0x9292;  // Fraction for DATE_TIME_DIGITIZED

    // GPS Info tags
    pub const GPS_LATITUDE_REF: u16 = 0x0001;  // 'N' or 'S'
    pub const GPS_LATITUDE: u16 = 0x0002;      // Three rationals: deg, min, sec
    pub const GPS_LONGITUDE_REF: u16 = 0x0003; // 'E' or 'W'
    pub const GPS_LONGITUDE: u16 = 0x0004;     // Three rationals: deg, min, sec
    pub const GPS_ALTITUDE_REF: u16 = 0x0005;  // 0 above sea level, 1 below
    pub const GPS_ALTITUDE: u16 = 0x0006;      // One rational, meters
    pub const GPS_TIME_STAMP: u16 = 0x0007;    // Three rationals: hour, min, sec
    pub const GPS_DATE_STAMP: u16 = 0x001D;    // ASCII "yyyy:MM:dd"

    // Descriptive text tags
    pub const IMAGE_DESCRIPTION: u16 = 0x010E; // Title, Primary Data
    pub const SOFTWARE: u16 = 0x0131;          // Producing software, Primary Data
    pub const ARTIST: u16 = 0x013B;            // Creator name, Primary Data
    pub const COPYRIGHT: u16 = 0x8298;         // Copyright notice, Primary Data
    pub const USER_COMMENT: u16 = 0x9286;      // Comment with charset prefix, Private Data

    // Embedded metadata blocks stored as plain TIFF tags
    pub const XMP_METADATA: u16 = 0x02BC;       // XMP packet in a TIFF IFD
    pub const IPTC_METADATA: u16 = 0x83BB;      // IPTC record in a TIFF IFD
    pub const PHOTOSHOP_SETTINGS: u16 = 0x8649; // Photoshop image resources
    pub const ICC_PROFILE: u16 = 0x8773;        // Embedded color profile

    // Strip and tile placement tags rewritten on TIFF save
    pub const STRIP_OFFSETS: u16 = 0x0111;     // Offsets to the data strips
    pub const STRIP_BYTE_COUNTS: u16 = 0x0117; // Byte counts for strips
    pub const TILE_OFFSETS: u16 = 0x0144;      // Offsets to the data tiles
    pub const TILE_BYTE_COUNTS: u16 = 0x0145;  // Byte counts for tiles

    /// Tags that belong to the TIFF container itself rather than to the
    /// photographic metadata: subfile kind, image geometry, sample
    /// layout, strip and tile placement, and metadata embedded as tags
    pub const TIFF_INTERNAL: &[u16] = &[
        0x00FE, // NewSubfileType
        0x00FF, // SubfileType
        0x0100, // ImageWidth
        0x0101, // ImageLength
        0x0102, // BitsPerSample
        0x0103, // Compression
        0x0106, // PhotometricInterpretation
        0x010A, // FillOrder
        STRIP_OFFSETS,
        0x0115, // SamplesPerPixel
        0x0116, // RowsPerStrip
        STRIP_BYTE_COUNTS,
        0x011C, // PlanarConfiguration
        0x013D, // Predictor
        0x0140, // ColorMap
        0x0142, // TileWidth
        0x0143, // TileLength
        TILE_OFFSETS,
        TILE_BYTE_COUNTS,
        0x0152, // ExtraSamples
        0x0153, // SampleFormat
        XMP_METADATA,
        IPTC_METADATA,
        PHOTOSHOP_SETTINGS,
        ICC_PROFILE,
    ];
}

/// Structural limits of the formats
pub mod limits {
    /// Largest stream the codec accepts (offsets are 32-bit signed downstream)
    pub const MAX_STREAM_SIZE: u64 = 0x7FFF_FFFF;

    /// Largest EXIF block a TIFF file can carry
    pub const MAX_TIFF_BLOCK_SIZE: u64 = 0x7FFF_FFFF;

    /// Fixed size of one IFD entry on the wire
    pub const IFD_ENTRY_SIZE: usize = 12;

    /// Smallest possible IFD: entry count plus next-IFD offset, no entries
    pub const EMPTY_IFD_SIZE: usize = 6;

    /// Upper bound on chained IFDs, guards against pointer cycles
    pub const MAX_IFD_COUNT: usize = 100;
}
