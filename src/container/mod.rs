//! Container format handling
//!
//! One module per supported image format plus the signature sniffing
//! shared by all of them. The containers locate and extract the EXIF
//! block on load and rebuild the surrounding file on save; the block
//! itself is parsed and serialized by the `exif` modules.

pub mod detect;
pub mod jpeg;
pub mod png;
pub mod tiff;
#[cfg(test)]
mod tests;

pub use detect::detect_format;
