//! Metadata structure analysis command
//!
//! This module implements the command for analyzing and displaying
//! the metadata carried by JPEG, TIFF and PNG files.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::exif::data::ExifData;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::strings::StrCoding;
use crate::exif::tag::TagItem;
use crate::exif::types::{ExifIfd, ImageFileBlock, TagType};
use crate::io::byte_order::ByteOrderHandler;
use crate::utils::logger::Logger;
use crate::utils::tag_names;

/// Command for analyzing the metadata of an image file
pub struct AnalyzeCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Whether to enable verbose output
    verbose: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> AnalyzeCommand<'a> {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new AnalyzeCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> ExifResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| ExifError::GenericError("Missing input file".to_string()))?
            .clone();

        let verbose = args.get_flag("verbose");

        Ok(AnalyzeCommand {
            input_file,
            verbose,
            logger,
        })
    }

    /// Display basic image information
    ///
    /// Shows the container format, byte order and which metadata
    /// blocks the file carries.
    ///
    /// # Arguments
    /// * `data` - The metadata object to analyze
    fn display_summary(&self, data: &ExifData) {
        info!("Metadata Analysis Results:");
        info!("  Format: {}", data.image_type());
        info!("  Byte order: {}", data.byte_order().name());

        let present: Vec<&str> = ImageFileBlock::ALL
            .iter()
            .filter(|block| data.image_file_block_exists(**block))
            .map(|block| block.name())
            .collect();
        if present.is_empty() {
            info!("  Blocks: none");
        } else {
            info!("  Blocks: {}", present.join(", "));
        }
    }

    /// Display the tags of one IFD
    ///
    /// Lists every tag with its name, wire type, element count and a
    /// short preview of the value.
    ///
    /// # Arguments
    /// * `data` - The metadata object to analyze
    /// * `ifd` - Which of the five IFDs to list
    fn display_ifd(&self, data: &ExifData, ifd: ExifIfd) {
        let count = data.tags_in(ifd).count();
        info!("\n{} IFD ({} tags)", ifd.name(), count);

        let handler = data.byte_order().create_handler();
        for item in data.tags_in(ifd) {
            info!("  0x{:04X} {} ({}, count {}): {}",
                  item.tag_id(),
                  tag_names::tag_name(ifd, item.tag_id()),
                  item.tag_type().name(),
                  item.value_count(),
                  self.format_tag_value(data, ifd, item, &*handler));
        }
    }

    /// Render a short preview of a tag value
    ///
    /// Strings are decoded, numeric types show their first elements,
    /// everything else falls back to the byte count.
    ///
    /// # Arguments
    /// * `data` - The metadata object the tag belongs to
    /// * `ifd` - The IFD holding the tag
    /// * `item` - The tag to render
    /// * `handler` - Handler for interpreting byte order
    fn format_tag_value(&self, data: &ExifData, ifd: ExifIfd,
                        item: &TagItem, handler: &dyn ByteOrderHandler) -> String {
        let max_elements = 4.min(item.value_count());

        match item.tag_type() {
            TagType::Ascii => {
                match data.tag_string(ifd, item.tag_id(), StrCoding::ascii()) {
                    Some(text) => format!("\"{}\"", text),
                    None => "<unreadable>".to_string(),
                }
            }
            TagType::Byte | TagType::UShort | TagType::ULong => {
                let values: Vec<String> = (0..max_elements)
                    .filter_map(|i| item.read_uint_element(i, handler))
                    .map(|v| v.to_string())
                    .collect();
                self.join_elements(values, item.value_count())
            }
            TagType::SByte | TagType::SShort | TagType::SLong => {
                let values: Vec<String> = (0..max_elements)
                    .filter_map(|i| item.read_int_element(i, handler))
                    .map(|v| v.to_string())
                    .collect();
                self.join_elements(values, item.value_count())
            }
            TagType::URational | TagType::SRational => {
                let values: Vec<String> = (0..max_elements)
                    .filter_map(|i| item.read_rational_element(i, handler))
                    .map(|r| {
                        let (numerator, denominator) = r.signed_parts();
                        format!("{}/{}", numerator, denominator)
                    })
                    .collect();
                self.join_elements(values, item.value_count())
            }
            TagType::Float | TagType::Double => {
                let values: Vec<String> = (0..max_elements)
                    .filter_map(|i| item.read_double_element(i, handler))
                    .map(|v| format!("{}", v))
                    .collect();
                self.join_elements(values, item.value_count())
            }
            TagType::Undefined => format!("{} bytes", item.byte_count()),
        }
    }

    /// Joins element previews, marking truncated lists with an ellipsis
    fn join_elements(&self, values: Vec<String>, total: u32) -> String {
        let mut text = values.join(", ");
        if (total as usize) > values.len() {
            text.push_str(", ...");
        }
        text
    }

    /// Display the date fields an image carries
    ///
    /// # Arguments
    /// * `data` - The metadata object to analyze
    fn display_dates(&self, data: &ExifData) {
        if let Some(date) = data.date_taken() {
            info!("  Date taken: {}", date);
        }
        if let Some(date) = data.date_digitized() {
            info!("  Date digitized: {}", date);
        }
        if let Some(date) = data.date_changed() {
            info!("  Date changed: {}", date);
        }
    }

    /// Display the GPS position if one is present
    ///
    /// # Arguments
    /// * `data` - The metadata object to analyze
    fn display_gps(&self, data: &ExifData) {
        if let (Some(latitude), Some(longitude)) = (data.gps_latitude(), data.gps_longitude()) {
            info!("  GPS position: {} {}", latitude, longitude);
            info!("  GPS decimal: {:.6}, {:.6}", latitude.to_decimal(), longitude.to_decimal());
        }
        if let Some(altitude) = data.gps_altitude() {
            info!("  GPS altitude: {:.1} m", altitude);
        }
    }

    /// Display thumbnail information if an embedded image is present
    ///
    /// # Arguments
    /// * `data` - The metadata object to analyze
    fn display_thumbnail(&self, data: &ExifData) {
        if let Some(image) = data.thumbnail_image() {
            info!("\nThumbnail image: {} bytes", image.len());
        }
    }
}

impl<'a> Command for AnalyzeCommand<'a> {
    fn execute(&self) -> ExifResult<()> {
        info!("Analyzing file: {}", self.input_file);

        if self.verbose {
            debug!("Verbose mode enabled");
        }

        let data = ExifData::from_file(&self.input_file)?;

        // Display basic image information
        self.display_summary(&data);

        // Process each populated IFD
        for ifd in ExifIfd::ALL {
            if data.ifd_exists(ifd) {
                self.display_ifd(&data, ifd);
            }
        }

        // Display the decoded convenience fields
        self.display_dates(&data);
        self.display_gps(&data);
        self.display_thumbnail(&data);

        debug!("Analysis completed successfully");
        self.logger.log("Analysis completed successfully")?;

        Ok(())
    }
}
