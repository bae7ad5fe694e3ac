use log::info;
use crate::exif::constants::tags;
use crate::exif::data::ExifData;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::types::{ExifIfd, ImageFileBlock, ImageFormat};
use crate::exif::values::{ExifDateTime, GeoCoordinate};
use crate::utils::logger::Logger;
use crate::utils::tag_names;

/// Main interface to the ExifKit library
pub struct ExifKit;

impl ExifKit {
    /// Create a new ExifKit instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, None logs to the console only
    ///
    /// # Returns
    /// An ExifKit instance or an error if initialization fails
    pub fn new(log_file: Option<&str>) -> ExifResult<Self> {
        Logger::init_global_logger(log_file, log::LevelFilter::Info)?;
        Ok(ExifKit)
    }

    /// Analyze an image file and return information about its metadata
    ///
    /// # Arguments
    /// * `input_path` - Path to the JPEG, TIFF or PNG file to analyze
    ///
    /// # Returns
    /// String containing analysis information or an error
    pub fn analyze(&self, input_path: &str) -> ExifResult<String> {
        let data = ExifData::from_file(input_path)?;

        let mut result = format!("Metadata Analysis Results:\n");
        result.push_str(&format!("  Format: {}\n", data.image_type()));
        result.push_str(&format!("  Byte order: {}\n", data.byte_order().name()));

        let present: Vec<&str> = ImageFileBlock::ALL
            .iter()
            .filter(|b| data.image_file_block_exists(**b))
            .map(|b| b.name())
            .collect();
        result.push_str(&format!("  Blocks: {}\n", if present.is_empty() {
            "none".to_string()
        } else {
            present.join(", ")
        }));

        // Add details for each populated IFD
        for ifd in ExifIfd::ALL {
            if !data.ifd_exists(ifd) {
                continue;
            }
            let count = data.tags_in(ifd).count();
            result.push_str(&format!("\n{} IFD ({} tags)\n", ifd.name(), count));
            for item in data.tags_in(ifd) {
                result.push_str(&format!(
                    "  0x{:04X} {} ({}, count {})\n",
                    item.tag_id(),
                    tag_names::tag_name(ifd, item.tag_id()),
                    item.tag_type().name(),
                    item.value_count()
                ));
            }
        }

        if let Some(image) = data.thumbnail_image() {
            result.push_str(&format!("\nThumbnail image: {} bytes\n", image.len()));
        }

        Ok(result)
    }

    /// Read the original capture date of an image
    ///
    /// # Arguments
    /// * `input_path` - Path to the image file
    ///
    /// # Returns
    /// The formatted date, or None when the file carries no capture date
    pub fn date_taken(&self, input_path: &str) -> ExifResult<Option<String>> {
        let data = ExifData::from_file(input_path)?;
        Ok(data.date_taken().map(|d| d.to_string()))
    }

    /// Set the original capture date of an image
    ///
    /// # Arguments
    /// * `input_path` - Path to the image file
    /// * `output_path` - Where to save the result, None rewrites the input file
    /// * `date` - Date in "YYYY:MM:DD HH:MM:SS" form
    ///
    /// # Returns
    /// Result indicating success or an error
    pub fn set_date_taken(
        &self,
        input_path: &str,
        output_path: Option<&str>,
        date: &str,
    ) -> ExifResult<()> {
        let value = ExifDateTime::parse_date_time(date)
            .ok_or_else(|| ExifError::GenericError(format!("Invalid date value: {}", date)))?;

        let mut data = ExifData::from_file(input_path)?;
        data.set_date_taken(&value);
        self.save_result(&mut data, output_path)
    }

    /// Read the GPS position of an image as decimal degrees
    ///
    /// # Arguments
    /// * `input_path` - Path to the image file
    ///
    /// # Returns
    /// (latitude, longitude) in decimal degrees, or None without a GPS block
    pub fn gps_position(&self, input_path: &str) -> ExifResult<Option<(f64, f64)>> {
        let data = ExifData::from_file(input_path)?;
        let position = match (data.gps_latitude(), data.gps_longitude()) {
            (Some(lat), Some(lon)) => Some((lat.to_decimal(), lon.to_decimal())),
            _ => None,
        };
        Ok(position)
    }

    /// Set the GPS position of an image
    ///
    /// # Arguments
    /// * `input_path` - Path to the image file
    /// * `output_path` - Where to save the result, None rewrites the input file
    /// * `latitude` - Latitude in decimal degrees, negative for south
    /// * `longitude` - Longitude in decimal degrees, negative for west
    ///
    /// # Returns
    /// Result indicating success or an error
    pub fn set_gps_position(
        &self,
        input_path: &str,
        output_path: Option<&str>,
        latitude: f64,
        longitude: f64,
    ) -> ExifResult<()> {
        let mut data = ExifData::from_file(input_path)?;
        data.set_gps_latitude(&GeoCoordinate::from_decimal(latitude, true));
        data.set_gps_longitude(&GeoCoordinate::from_decimal(longitude, false));
        self.save_result(&mut data, output_path)
    }

    /// Remove all metadata an image carries
    ///
    /// Clears every EXIF tag and drops the auxiliary blocks. TIFF files
    /// keep the tags the image structure itself needs.
    ///
    /// # Arguments
    /// * `input_path` - Path to the image file
    /// * `output_path` - Where to save the result, None rewrites the input file
    ///
    /// # Returns
    /// Result indicating success or an error
    pub fn strip_metadata(&self, input_path: &str, output_path: Option<&str>) -> ExifResult<()> {
        let mut data = ExifData::from_file(input_path)?;

        if data.image_type() == ImageFormat::Tiff {
            // The primary IFD doubles as the image directory, so only the
            // descriptive tags may go
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
        } else {
            data.remove_all_tags();
        }

        for block in [
            ImageFileBlock::Iptc,
            ImageFileBlock::Xmp,
            ImageFileBlock::JpegComment,
            ImageFileBlock::PngMetaData,
            ImageFileBlock::PngDateChanged,
        ] {
            data.remove_image_file_block(block);
        }
        self.save_result(&mut data, output_path)
    }

    /// Copy all EXIF tags from one image to another
    ///
    /// # Arguments
    /// * `source_path` - Path to the image to take the tags from
    /// * `target_path` - Path to the image that receives them
    /// * `output_path` - Where to save the result, None rewrites the target file
    ///
    /// # Returns
    /// Result indicating success or an error
    pub fn copy_metadata(
        &self,
        source_path: &str,
        target_path: &str,
        output_path: Option<&str>,
    ) -> ExifResult<()> {
        info!("Copying metadata from {} to {}", source_path, target_path);

        let source = ExifData::from_file(source_path)?;
        let mut target = ExifData::from_file(target_path)?;
        target.replace_all_tags_by(&source);
        self.save_result(&mut target, output_path)
    }

    /// Helper to save to a new file or back into the source
    fn save_result(&self, data: &mut ExifData, output_path: Option<&str>) -> ExifResult<()> {
        match output_path {
            Some(path) => data.save_as(path),
            None => data.save(),
        }
    }
}
