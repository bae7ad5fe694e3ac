//! I/O utilities for stream handling
//!
//! This module provides the seekable reader/writer traits the codec
//! works against and the byte order abstraction used for all numeric
//! reads and writes.

pub mod seekable;
pub mod byte_order;
