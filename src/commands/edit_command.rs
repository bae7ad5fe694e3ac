//! Metadata editing command
//!
//! This module implements the command for changing dates, descriptive
//! text and the GPS position of an image file in place or into a copy.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::Command;
use crate::exif::constants::tags;
use crate::exif::data::ExifData;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::strings::StrCoding;
use crate::exif::types::ExifIfd;
use crate::exif::values::{ExifDateTime, GeoCoordinate};
use crate::utils::logger::Logger;

/// Command for editing the metadata of an image file
pub struct EditCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the output file, None rewrites the input in place
    output_file: Option<String>,
    /// Optional source image whose tags replace the input's tags first
    copy_from: Option<String>,
    /// New capture date
    date_taken: Option<ExifDateTime>,
    /// New digitization date
    date_digitized: Option<ExifDateTime>,
    /// New creator name
    artist: Option<String>,
    /// New image description
    description: Option<String>,
    /// New copyright notice
    copyright: Option<String>,
    /// New producing software name
    software: Option<String>,
    /// New user comment
    user_comment: Option<String>,
    /// New GPS position in decimal degrees
    gps_position: Option<(f64, f64)>,
    /// New GPS altitude in meters, negative below sea level
    gps_altitude: Option<f64>,
    /// Whether to drop the whole GPS Info IFD
    remove_gps: bool,
    /// Whether to drop the embedded thumbnail
    remove_thumbnail: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> EditCommand<'a> {
    /// Create a new edit command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new EditCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> ExifResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| ExifError::GenericError("Missing input file".to_string()))?
            .clone();

        let output_file = args.get_one::<String>("output").cloned();
        let copy_from = args.get_one::<String>("copy-from").cloned();

        let date_taken = Self::parse_date_arg(args, "date-taken")?;
        let date_digitized = Self::parse_date_arg(args, "date-digitized")?;

        let gps_position = match args.get_one::<String>("gps") {
            Some(text) => Some(Self::parse_position(text)?),
            None => None,
        };

        let gps_altitude = match args.get_one::<String>("altitude") {
            Some(text) => Some(text.parse::<f64>()
                .map_err(|_| ExifError::GenericError(format!("Invalid altitude: {}", text)))?),
            None => None,
        };

        Ok(EditCommand {
            input_file,
            output_file,
            copy_from,
            date_taken,
            date_digitized,
            artist: args.get_one::<String>("artist").cloned(),
            description: args.get_one::<String>("description").cloned(),
            copyright: args.get_one::<String>("copyright").cloned(),
            software: args.get_one::<String>("software").cloned(),
            user_comment: args.get_one::<String>("comment").cloned(),
            gps_position,
            gps_altitude,
            remove_gps: args.get_flag("remove-gps"),
            remove_thumbnail: args.get_flag("remove-thumbnail"),
            logger,
        })
    }

    /// Parse an optional date argument in "YYYY:MM:DD HH:MM:SS" form
    fn parse_date_arg(args: &ArgMatches, name: &str) -> ExifResult<Option<ExifDateTime>> {
        match args.get_one::<String>(name) {
            Some(text) => ExifDateTime::parse_date_time(text)
                .map(Some)
                .ok_or_else(|| ExifError::GenericError(format!("Invalid date value: {}", text))),
            None => Ok(None),
        }
    }

    /// Parse a "latitude,longitude" pair in decimal degrees
    fn parse_position(text: &str) -> ExifResult<(f64, f64)> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != 2 {
            return Err(ExifError::GenericError(
                format!("Invalid GPS position, expected 'lat,lon': {}", text)));
        }

        let latitude = parts[0].trim().parse::<f64>()
            .map_err(|_| ExifError::GenericError(format!("Invalid latitude: {}", parts[0])))?;
        let longitude = parts[1].trim().parse::<f64>()
            .map_err(|_| ExifError::GenericError(format!("Invalid longitude: {}", parts[1])))?;

        if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
            return Err(ExifError::GenericError(
                format!("GPS position out of range: {}", text)));
        }

        Ok((latitude, longitude))
    }

    /// Apply every requested change to the loaded metadata object
    fn apply_edits(&self, data: &mut ExifData) -> ExifResult<()> {
        if let Some(source_path) = &self.copy_from {
            info!("Replacing tags with those of {}", source_path);
            let source = ExifData::from_file(source_path)?;
            data.replace_all_tags_by(&source);
        }

        if let Some(date) = &self.date_taken {
            debug!("Setting date taken to {}", date);
            data.set_date_taken(date);
        }
        if let Some(date) = &self.date_digitized {
            debug!("Setting date digitized to {}", date);
            data.set_date_digitized(date);
        }

        if let Some(text) = &self.artist {
            data.set_tag_string(ExifIfd::PrimaryData, tags::ARTIST, text, StrCoding::ascii());
        }
        if let Some(text) = &self.description {
            data.set_tag_string(ExifIfd::PrimaryData, tags::IMAGE_DESCRIPTION, text, StrCoding::ascii());
        }
        if let Some(text) = &self.copyright {
            data.set_tag_string(ExifIfd::PrimaryData, tags::COPYRIGHT, text, StrCoding::ascii());
        }
        if let Some(text) = &self.software {
            data.set_tag_string(ExifIfd::PrimaryData, tags::SOFTWARE, text, StrCoding::ascii());
        }
        if let Some(text) = &self.user_comment {
            data.set_tag_string(ExifIfd::PrivateData, tags::USER_COMMENT, text, StrCoding::id_code_ascii());
        }

        if let Some((latitude, longitude)) = self.gps_position {
            debug!("Setting GPS position to {}, {}", latitude, longitude);
            data.set_gps_latitude(&GeoCoordinate::from_decimal(latitude, true));
            data.set_gps_longitude(&GeoCoordinate::from_decimal(longitude, false));
        }
        if let Some(meters) = self.gps_altitude {
            data.set_gps_altitude(meters);
        }

        if self.remove_gps {
            info!("Removing GPS Info IFD");
            data.remove_all_tags_from_ifd(ExifIfd::GpsInfoData);
        }
        if self.remove_thumbnail {
            info!("Removing thumbnail image");
            data.remove_thumbnail_image(true);
        }

        Ok(())
    }
}

impl<'a> Command for EditCommand<'a> {
    fn execute(&self) -> ExifResult<()> {
        info!("Editing metadata of {}", self.input_file);

        let mut data = ExifData::from_file(&self.input_file)?;
        self.apply_edits(&mut data)?;

        match &self.output_file {
            Some(path) => {
                info!("Saving result to {}", path);
                data.save_as(path)?;
            }
            None => {
                info!("Rewriting {} in place", self.input_file);
                data.save()?;
            }
        }

        info!("Metadata edit successful");
        self.logger.log("Metadata edit successful")?;

        Ok(())
    }
}
