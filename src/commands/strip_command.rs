//! Metadata removal command
//!
//! This module implements the command for stripping metadata from an
//! image file, typically before publishing it. By default every block
//! goes; `--blocks` limits the removal to a chosen subset.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::exif::constants::tags;
use crate::exif::data::ExifData;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::types::{ExifIfd, ImageFileBlock, ImageFormat};
use crate::utils::logger::Logger;

/// Command for removing metadata blocks from an image file
pub struct StripCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the output file, None rewrites the input in place
    output_file: Option<String>,
    /// Blocks to remove, None strips everything
    blocks: Option<Vec<ImageFileBlock>>,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> StripCommand<'a> {
    /// Create a new strip command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new StripCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> ExifResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| ExifError::GenericError("Missing input file".to_string()))?
            .clone();

        let output_file = args.get_one::<String>("output").cloned();
        let blocks = match args.get_one::<String>("blocks") {
            Some(list) => Some(parse_blocks(list)?),
            None => None,
        };

        Ok(StripCommand {
            input_file,
            output_file,
            blocks,
            logger,
        })
    }
}

impl<'a> Command for StripCommand<'a> {
    fn execute(&self) -> ExifResult<()> {
        info!("Stripping metadata from {}", self.input_file);

        let mut data = ExifData::from_file(&self.input_file)?;

        match &self.blocks {
            Some(selection) => {
                for block in selection {
                    remove_block(&mut data, *block);
                }
            }
            None => {
                for block in ImageFileBlock::ALL {
                    remove_block(&mut data, block);
                }
            }
        }

        match &self.output_file {
            Some(path) => data.save_as(path)?,
            None => data.save()?,
        }

        info!("Metadata strip successful");
        self.logger.log("Metadata strip successful")?;

        Ok(())
    }
}

/// Parses a comma-separated block list from the command line
fn parse_blocks(list: &str) -> ExifResult<Vec<ImageFileBlock>> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.to_ascii_lowercase().as_str() {
            "exif" => Ok(ImageFileBlock::Exif),
            "iptc" => Ok(ImageFileBlock::Iptc),
            "xmp" => Ok(ImageFileBlock::Xmp),
            "comment" => Ok(ImageFileBlock::JpegComment),
            "pngtext" => Ok(ImageFileBlock::PngMetaData),
            "pngtime" => Ok(ImageFileBlock::PngDateChanged),
            other => Err(ExifError::GenericError(format!(
                "Unknown metadata block '{}'",
                other
            ))),
        })
        .collect()
}

/// Removes one metadata block kind from the loaded object
fn remove_block(data: &mut ExifData, block: ImageFileBlock) {
    if block == ImageFileBlock::Exif {
        remove_exif_tags(data);
        return;
    }
    if data.image_file_block_exists(block) {
        info!("Removing {} block", block.name());
        data.remove_image_file_block(block);
    }
}

/// Drop every EXIF tag the image can live without
///
/// JPEG and PNG lose the whole block. A TIFF keeps the tags describing
/// the image layout, everything else goes.
fn remove_exif_tags(data: &mut ExifData) {
    if data.image_type() != ImageFormat::Tiff {
        data.remove_all_tags();
        return;
    }

    for ifd in [
        ExifIfd::PrivateData,
        ExifIfd::GpsInfoData,
        ExifIfd::Interoperability,
        ExifIfd::ThumbnailData,
    ] {
        data.remove_all_tags_from_ifd(ifd);
    }

    data.init_tag_enumeration(ExifIfd::PrimaryData);
    while let Some((ifd, tag_id)) = data.enumerate_next_tag() {
        if !tags::TIFF_INTERNAL.contains(&tag_id) {
            data.remove_tag(ifd, tag_id);
        }
    }
    data.remove_thumbnail_image(true);
}
