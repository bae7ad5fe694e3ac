//! Seekable stream traits
//!
//! This module provides unified traits for streams that support both
//! sequential access and seeking operations.

use std::io::{Read, Seek, Write};

/// Trait for readers that can both read and seek
///
/// This trait combines the Read and Seek traits for use with
/// various readers throughout the application. Seekability is a hard
/// requirement of the codec, so it is enforced here at the type level.
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Trait for writers that can both write and seek
///
/// Rewriting an image needs to jump back to patch offsets that are only
/// known once later parts of the file have been laid out.
pub trait SeekableWriter: Write + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Write + Seek + Send + Sync> SeekableWriter for T {}
