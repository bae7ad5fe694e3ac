//! String utility functions
//!
//! Utilities for working with strings and text data.

/// Returns the slice without its trailing null bytes
pub fn strip_trailing_nulls(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == 0 {
        end -= 1;
    }
    &bytes[..end]
}

/// Returns the slice without trailing null UTF-16 code units
///
/// Strips two bytes at a time so a terminator is removed as a whole
/// unit and string content ending in 0x00 survives.
pub fn strip_trailing_nulls_utf16(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end >= 2 && bytes[end - 1] == 0 && bytes[end - 2] == 0 {
        end -= 2;
    }
    &bytes[..end]
}
