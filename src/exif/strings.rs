//! String tag coding
//!
//! EXIF stores text in several shapes: ASCII-typed values with a null
//! terminator, byte-typed UTF-16 (the Windows XP* tags), undefined-typed
//! payloads without a terminator, and undefined-typed payloads opened by
//! an 8-byte character code (the UserComment layout). This module encodes
//! and decodes all of them against a chosen text code page.

use crate::exif::types::TagType;
use crate::io::byte_order::ByteOrder;
use crate::utils::string_utils::{strip_trailing_nulls, strip_trailing_nulls_utf16};

/// ID code prefix selecting UTF-16 content in a UserComment-style tag
const ID_CODE_UNICODE: [u8; 8] = *b"UNICODE\0";

/// ID code prefix selecting single-byte content in a UserComment-style tag
const ID_CODE_ASCII: [u8; 8] = *b"ASCII\0\0\0";

/// Text code pages supported for string tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    /// 7-bit ASCII, anything else becomes '?'
    UsAscii,
    /// Western European single-byte page
    Latin1,
    /// UTF-8
    Utf8,
    /// UTF-16 little-endian
    Utf16Le,
    /// UTF-16 big-endian
    Utf16Be,
}

impl CodePage {
    /// True for the two UTF-16 pages
    pub fn is_utf16(&self) -> bool {
        matches!(self, CodePage::Utf16Le | CodePage::Utf16Be)
    }

    /// The UTF-16 page matching a block byte order
    pub fn utf16_for(byte_order: ByteOrder) -> CodePage {
        match byte_order {
            ByteOrder::LittleEndian => CodePage::Utf16Le,
            ByteOrder::BigEndian => CodePage::Utf16Be,
        }
    }

    /// Width of the null terminator for this page
    pub fn terminator_len(&self) -> usize {
        if self.is_utf16() {
            2
        } else {
            1
        }
    }

    /// Encodes text into bytes for this page
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            CodePage::UsAscii => text
                .chars()
                .map(|c| if (c as u32) < 0x80 { c as u8 } else { b'?' })
                .collect(),
            CodePage::Latin1 => text
                .chars()
                .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
                .collect(),
            CodePage::Utf8 => text.as_bytes().to_vec(),
            CodePage::Utf16Le => text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
            CodePage::Utf16Be => text
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect(),
        }
    }

    /// Decodes bytes into text for this page
    ///
    /// Undecodable content degrades to replacement characters, a decode
    /// never fails outright.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            CodePage::UsAscii => bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { '?' })
                .collect(),
            CodePage::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            CodePage::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            CodePage::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            CodePage::Utf16Be => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
        }
    }
}

/// The four wire shapes a string tag can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrCodingFormat {
    /// ASCII-typed value with a null terminator
    TypeAscii,
    /// Undefined-typed payload, no terminator
    TypeUndefined,
    /// Byte-typed value with a null terminator (Windows XP* tags)
    TypeByte,
    /// Undefined-typed payload opened by an 8-byte ID code (UserComment)
    TypeUndefinedWithIdCode,
}

impl StrCodingFormat {
    /// The tag type this format demands on the wire
    pub fn tag_type(&self) -> TagType {
        match self {
            StrCodingFormat::TypeAscii => TagType::Ascii,
            StrCodingFormat::TypeUndefined | StrCodingFormat::TypeUndefinedWithIdCode => {
                TagType::Undefined
            }
            StrCodingFormat::TypeByte => TagType::Byte,
        }
    }
}

/// A complete string coding mode: wire shape plus text code page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrCoding {
    pub format: StrCodingFormat,
    pub code_page: CodePage,
}

impl StrCoding {
    /// Classic ASCII-typed, US-ASCII text
    pub fn ascii() -> Self {
        StrCoding {
            format: StrCodingFormat::TypeAscii,
            code_page: CodePage::UsAscii,
        }
    }

    /// ASCII-typed slot carrying UTF-8 bytes
    pub fn utf8() -> Self {
        StrCoding {
            format: StrCodingFormat::TypeAscii,
            code_page: CodePage::Utf8,
        }
    }

    /// ASCII-typed slot carrying Western European single-byte text
    pub fn west_european() -> Self {
        StrCoding {
            format: StrCodingFormat::TypeAscii,
            code_page: CodePage::Latin1,
        }
    }

    /// Byte-typed UTF-16LE, the layout of the Windows XP* tags
    pub fn xp() -> Self {
        StrCoding {
            format: StrCodingFormat::TypeByte,
            code_page: CodePage::Utf16Le,
        }
    }

    /// Undefined-typed UTF-8 payload without a terminator
    pub fn undefined_utf8() -> Self {
        StrCoding {
            format: StrCodingFormat::TypeUndefined,
            code_page: CodePage::Utf8,
        }
    }

    /// UserComment layout with UTF-16 content
    ///
    /// The actual endianness follows the block byte order at codec time.
    pub fn id_code_utf16() -> Self {
        StrCoding {
            format: StrCodingFormat::TypeUndefinedWithIdCode,
            code_page: CodePage::Utf16Le,
        }
    }

    /// UserComment layout with US-ASCII content
    pub fn id_code_ascii() -> Self {
        StrCoding {
            format: StrCodingFormat::TypeUndefinedWithIdCode,
            code_page: CodePage::UsAscii,
        }
    }
}

/// Encodes a string into a tag payload, returning the wire tag type
pub fn encode_string(text: &str, coding: StrCoding, byte_order: ByteOrder) -> (TagType, Vec<u8>) {
    let tag_type = coding.format.tag_type();
    match coding.format {
        StrCodingFormat::TypeAscii | StrCodingFormat::TypeByte => {
            let mut payload = coding.code_page.encode(text);
            payload.extend(std::iter::repeat(0).take(coding.code_page.terminator_len()));
            (tag_type, payload)
        }
        StrCodingFormat::TypeUndefined => (tag_type, coding.code_page.encode(text)),
        StrCodingFormat::TypeUndefinedWithIdCode => {
            let mut payload = Vec::new();
            if coding.code_page.is_utf16() {
                let page = CodePage::utf16_for(byte_order);
                payload.extend_from_slice(&ID_CODE_UNICODE);
                payload.extend_from_slice(&page.encode(text));
            } else {
                payload.extend_from_slice(&ID_CODE_ASCII);
                payload.extend_from_slice(&coding.code_page.encode(text));
            }
            (tag_type, payload)
        }
    }
}

/// Decodes a tag payload into a string
///
/// Returns None when the stored tag type does not match the coding's
/// wire shape, or when an ID-code payload is too short to carry one.
pub fn decode_string(
    bytes: &[u8],
    tag_type: TagType,
    coding: StrCoding,
    byte_order: ByteOrder,
) -> Option<String> {
    if tag_type != coding.format.tag_type() {
        return None;
    }
    match coding.format {
        StrCodingFormat::TypeAscii | StrCodingFormat::TypeByte | StrCodingFormat::TypeUndefined => {
            Some(decode_stripped(bytes, coding.code_page))
        }
        StrCodingFormat::TypeUndefinedWithIdCode => {
            if bytes.is_empty() {
                return Some(String::new());
            }
            if bytes.len() < ID_CODE_UNICODE.len() {
                return None;
            }
            let (id_code, payload) = bytes.split_at(ID_CODE_UNICODE.len());
            let page = if id_code == ID_CODE_UNICODE {
                // UNICODE content follows the block byte order no matter
                // what page the caller asked for
                CodePage::utf16_for(byte_order)
            } else if coding.code_page.is_utf16() {
                // ASCII, all-zero or unknown ID codes mean single-byte
                // content, so a UTF-16 request falls back to US-ASCII
                CodePage::UsAscii
            } else {
                coding.code_page
            };
            Some(decode_stripped(payload, page))
        }
    }
}

fn decode_stripped(bytes: &[u8], page: CodePage) -> String {
    let stripped = if page.is_utf16() {
        strip_trailing_nulls_utf16(bytes)
    } else {
        strip_trailing_nulls(bytes)
    };
    page.decode(stripped)
}
