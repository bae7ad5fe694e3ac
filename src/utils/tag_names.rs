//! EXIF tag name definitions
//!
//! This module maps tag ids to their conventional names for display
//! purposes. The names live in a TOML file compiled into the binary,
//! grouped by the IFD the tags appear in.

use std::collections::HashMap;
use lazy_static::lazy_static;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::types::ExifIfd;

lazy_static! {
    // Parse the TOML file at startup
    static ref TAG_DEFINITIONS: TagDefinitions = {
        let content = include_str!("../../exif_tags.toml");
        TagDefinitions::from_str(content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse EXIF tag definitions: {}", e);
                TagDefinitions::default()
            })
    };
}

/// Container for the per-IFD tag name tables
#[derive(Debug, Default)]
pub struct TagDefinitions {
    // Maps Primary and Thumbnail Data tag ids to names
    pub primary_names: HashMap<u16, String>,
    // Maps Private Data tag ids to names
    pub private_names: HashMap<u16, String>,
    // Maps GPS Info tag ids to names
    pub gps_names: HashMap<u16, String>,
    // Maps Interoperability tag ids to names
    pub interop_names: HashMap<u16, String>,
}

impl TagDefinitions {
    /// Parse tag definitions from a TOML string
    pub fn from_str(content: &str) -> ExifResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => {
                return Err(ExifError::GenericError(format!(
                    "Failed to parse TOML: {}",
                    e
                )))
            }
        };

        let mut defs = TagDefinitions::default();
        Self::parse_name_table(&toml_value, "primary_tags", &mut defs.primary_names);
        Self::parse_name_table(&toml_value, "private_tags", &mut defs.private_names);
        Self::parse_name_table(&toml_value, "gps_tags", &mut defs.gps_names);
        Self::parse_name_table(&toml_value, "interop_tags", &mut defs.interop_names);
        Ok(defs)
    }

    /// Helper to parse one table of decimal tag id to name mappings
    fn parse_name_table(toml_value: &toml::Value, table_name: &str, map: &mut HashMap<u16, String>) {
        if let Some(table) = toml_value.get(table_name).and_then(|v| v.as_table()) {
            for (k, v) in table {
                if let (Ok(id), Some(name)) = (k.parse::<u16>(), v.as_str()) {
                    map.insert(id, name.to_string());
                }
            }
        }
    }
}

/// Gets the conventional name of a tag within its IFD
///
/// Thumbnail Data shares the Primary Data names; Private Data falls
/// back to them for the TIFF tags that may appear in either place.
pub fn tag_name(ifd: ExifIfd, tag_id: u16) -> String {
    let defs = &*TAG_DEFINITIONS;
    let found = match ifd {
        ExifIfd::PrimaryData | ExifIfd::ThumbnailData => defs.primary_names.get(&tag_id),
        ExifIfd::PrivateData => defs
            .private_names
            .get(&tag_id)
            .or_else(|| defs.primary_names.get(&tag_id)),
        ExifIfd::GpsInfoData => defs.gps_names.get(&tag_id),
        ExifIfd::Interoperability => defs.interop_names.get(&tag_id),
    };
    match found {
        Some(name) => name.clone(),
        None => format!("Unknown-0x{:04X}", tag_id),
    }
}

/// Whether the definitions know a tag under this id
pub fn tag_is_known(ifd: ExifIfd, tag_id: u16) -> bool {
    let defs = &*TAG_DEFINITIONS;
    match ifd {
        ExifIfd::PrimaryData | ExifIfd::ThumbnailData => defs.primary_names.contains_key(&tag_id),
        ExifIfd::PrivateData => {
            defs.private_names.contains_key(&tag_id) || defs.primary_names.contains_key(&tag_id)
        }
        ExifIfd::GpsInfoData => defs.gps_names.contains_key(&tag_id),
        ExifIfd::Interoperability => defs.interop_names.contains_key(&tag_id),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn known_tag_names_resolve() {
        std::assert_eq!(tag_name(ExifIfd::PrimaryData, 0x0132), "DateTime");
        std::assert_eq!(tag_name(ExifIfd::PrivateData, 0x9003), "DateTimeOriginal");
        std::assert_eq!(tag_name(ExifIfd::GpsInfoData, 0x0002), "GPSLatitude");
    }

    #[test]
    fn unknown_tags_fall_back_to_hex() {
        std::assert_eq!(tag_name(ExifIfd::PrimaryData, 0xFEFE), "Unknown-0xFEFE");
        std::assert!(!tag_is_known(ExifIfd::GpsInfoData, 0xFEFE));
    }

    #[test]
    fn private_data_falls_back_to_primary_names() {
        // the modification date may appear in Private Data copies
        std::assert_eq!(tag_name(ExifIfd::PrivateData, 0x0132), "DateTime");
    }
}
