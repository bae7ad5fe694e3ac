//! The in-memory metadata object
//!
//! `ExifData` owns the five tag tables of one image plus the thumbnail
//! and the presence flags of the auxiliary text blocks. It is created by
//! scanning a JPEG, TIFF or PNG source and is saved by rebuilding the
//! EXIF block from scratch while copying everything else through from
//! the source. One instance belongs to one caller; there is no internal
//! locking.

use std::fs::{self, File};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::container;
use crate::exif::constants::tags;
use crate::exif::errors::{ExifError, ExifResult};
use crate::exif::reader::{BlockContent, ExifBlockReader};
use crate::exif::strings::{decode_string, encode_string, StrCoding};
use crate::exif::tag::{IfdTable, TagItem};
use crate::exif::types::{BlockStatus, ExifIfd, ImageFileBlock, ImageFormat, TagType, TiffHeader};
use crate::exif::validation;
use crate::exif::values::{ExifDateTime, ExifRational, GeoCoordinate};
use crate::exif::writer::ExifBlockWriter;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::{SeekableReader, SeekableWriter};

/// How a source image is loaded
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Skip the source's EXIF block and start with empty tag tables
    pub create_empty_block: bool,
    /// Byte order for a freshly created block; ignored when an existing
    /// block or a TIFF header dictates the order
    pub byte_order: ByteOrder,
}

impl Default for LoadOptions {
    fn default() -> LoadOptions {
        LoadOptions {
            create_empty_block: false,
            byte_order: ByteOrder::LittleEndian,
        }
    }
}

/// Where the metadata object came from, kept for the save pass
enum ImageSource {
    Path(PathBuf),
    Stream(Box<dyn SeekableReader>),
}

/// Snapshot cursor over one table's tag ids
struct TagEnumeration {
    ifd: ExifIfd,
    tag_ids: Vec<u16>,
    position: usize,
}

/// Metadata of one image: tag tables, thumbnail and block presence
pub struct ExifData {
    source: Option<ImageSource>,
    image_type: ImageFormat,
    byte_order: ByteOrder,
    handler: Box<dyn ByteOrderHandler>,
    tables: [IfdTable; 5],
    thumbnail: Option<Vec<u8>>,
    block_status: [BlockStatus; 6],
    maker_note_original_offset: u32,
    next_image_offset: u32,
    enumeration: Option<TagEnumeration>,
}

impl ExifData {
    /// Loads metadata from an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ExifResult<ExifData> {
        Self::from_file_with_options(path, LoadOptions::default())
    }

    /// Loads metadata from an image file with explicit options
    pub fn from_file_with_options<P: AsRef<Path>>(
        path: P,
        options: LoadOptions,
    ) -> ExifResult<ExifData> {
        info!("Loading image metadata from {}", path.as_ref().display());
        let mut file = File::open(path.as_ref())?;
        let mut data = Self::load_from_reader(&mut file, options)?;
        data.source = Some(ImageSource::Path(path.as_ref().to_path_buf()));
        Ok(data)
    }

    /// Loads metadata from a seekable stream; ownership of the stream
    /// is kept so the save pass can copy the image through
    pub fn from_stream(stream: Box<dyn SeekableReader>) -> ExifResult<ExifData> {
        Self::from_stream_with_options(stream, LoadOptions::default())
    }

    /// Loads metadata from a seekable stream with explicit options
    pub fn from_stream_with_options(
        mut stream: Box<dyn SeekableReader>,
        options: LoadOptions,
    ) -> ExifResult<ExifData> {
        let mut data = Self::load_from_reader(stream.as_mut(), options)?;
        data.source = Some(ImageSource::Stream(stream));
        Ok(data)
    }

    fn load_from_reader(
        reader: &mut dyn SeekableReader,
        options: LoadOptions,
    ) -> ExifResult<ExifData> {
        let length = validation::stream_len(reader)?;
        validation::check_stream_size(length)?;
        let image_type = container::detect_format(reader)?;
        debug!("Detected image type: {}", image_type);

        let mut data = ExifData {
            source: None,
            image_type,
            byte_order: options.byte_order,
            handler: options.byte_order.create_handler(),
            tables: Default::default(),
            thumbnail: None,
            block_status: [BlockStatus::NonExistent; 6],
            maker_note_original_offset: 0,
            next_image_offset: 0,
            enumeration: None,
        };

        match image_type {
            ImageFormat::Jpeg => {
                let scan = container::jpeg::scan(reader)?;
                data.block_status = scan.block_status;
                if !options.create_empty_block {
                    if let Some(block) = scan.exif_block {
                        data.adopt_block(ExifBlockReader::read_resident_block(block)?);
                    }
                }
            }
            ImageFormat::Png => {
                let scan = container::png::scan(reader)?;
                data.block_status = scan.block_status;
                if !options.create_empty_block {
                    if let Some(block) = scan.exif_block {
                        data.adopt_block(ExifBlockReader::read_resident_block(block)?);
                    }
                }
            }
            ImageFormat::Tiff => {
                // the whole file is the block; the header byte order is
                // authoritative even for an empty start
                reader.seek(SeekFrom::Start(0))?;
                let header = TiffHeader::read(reader)?;
                data.byte_order = header.byte_order;
                data.handler = header.byte_order.create_handler();
                data.block_status[ImageFileBlock::Exif.index()] = BlockStatus::Existent;
                if !options.create_empty_block {
                    let block_reader = ExifBlockReader::new(header.byte_order);
                    let content = block_reader.read_stream_tree(
                        reader,
                        length,
                        header.byte_order,
                        header.first_ifd_offset,
                    )?;
                    data.adopt_block(content);
                }
            }
        }
        Ok(data)
    }

    fn adopt_block(&mut self, content: BlockContent) {
        self.byte_order = content.byte_order;
        self.handler = content.byte_order.create_handler();
        self.tables = content.tables;
        self.thumbnail = content.thumbnail;
        self.maker_note_original_offset = content.maker_note_original_offset;
        self.next_image_offset = content.next_image_offset;
        self.block_status[ImageFileBlock::Exif.index()] = BlockStatus::Existent;
    }

    pub fn image_type(&self) -> ImageFormat {
        self.image_type
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    // ---- saving --------------------------------------------------------

    /// Saves back to the file this object was loaded from
    ///
    /// The new image is written to a temporary sibling file first and
    /// only renamed over the original after a complete, successful
    /// write. On any error the original file is left untouched.
    pub fn save(&mut self) -> ExifResult<()> {
        let path = match &self.source {
            Some(ImageSource::Path(path)) => path.clone(),
            _ => {
                return Err(ExifError::GenericError(
                    "in-place save requires a file path source".to_string(),
                ))
            }
        };
        self.save_as(path)
    }

    /// Saves to a destination path, atomically via a temporary file
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> ExifResult<()> {
        let dest_path = path.as_ref();
        info!("Saving image metadata to {}", dest_path.display());
        let mut temp_name = dest_path.as_os_str().to_os_string();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let written = File::create(&temp_path)
            .map_err(ExifError::from)
            .and_then(|mut file| self.save_to_stream(&mut file));
        match written {
            Ok(()) => {
                fs::rename(&temp_path, dest_path)?;
                Ok(())
            }
            Err(error) => {
                let _ = fs::remove_file(&temp_path);
                Err(error)
            }
        }
    }

    /// Writes the complete image with updated metadata to a stream
    pub fn save_to_stream(&mut self, dest: &mut dyn SeekableWriter) -> ExifResult<()> {
        let mut source = match self.source.take() {
            Some(source) => source,
            None => {
                return Err(ExifError::GenericError(
                    "metadata object has no source image".to_string(),
                ))
            }
        };
        let result = match &mut source {
            ImageSource::Path(path) => File::open(&path)
                .map_err(ExifError::from)
                .and_then(|mut file| self.write_container(&mut file, dest)),
            ImageSource::Stream(stream) => self.write_container(stream.as_mut(), dest),
        };
        self.source = Some(source);
        result
    }

    fn write_container(
        &mut self,
        source: &mut dyn SeekableReader,
        dest: &mut dyn SeekableWriter,
    ) -> ExifResult<()> {
        // the source must still be what this object was derived from
        let found = container::detect_format(source)?;
        if found != self.image_type {
            return Err(ExifError::ImageTypeMismatch {
                loaded: self.image_type,
                found,
            });
        }
        match self.image_type {
            ImageFormat::Jpeg => {
                let writer = ExifBlockWriter::new(self.byte_order);
                let block = writer.write_block(
                    &mut self.tables,
                    self.thumbnail.as_deref(),
                    self.maker_note_original_offset,
                );
                container::jpeg::save(source, dest, block.as_deref(), &self.block_status)
            }
            ImageFormat::Png => {
                let writer = ExifBlockWriter::new(self.byte_order);
                let block = writer.write_block(
                    &mut self.tables,
                    self.thumbnail.as_deref(),
                    self.maker_note_original_offset,
                );
                container::png::save(source, dest, block.as_deref(), &self.block_status)
            }
            ImageFormat::Tiff => container::tiff::save(
                source,
                dest,
                self.byte_order,
                &self.tables,
                self.maker_note_original_offset,
                self.next_image_offset,
            ),
        }
    }

    // ---- typed tag access ----------------------------------------------

    /// Reads a tag as a string using the given coding
    pub fn tag_string(&self, ifd: ExifIfd, tag_id: u16, coding: StrCoding) -> Option<String> {
        let item = self.tables[ifd.index()].get(tag_id)?;
        decode_string(
            item.value_bytes(),
            item.tag_type(),
            coding,
            self.byte_order,
        )
    }

    /// Writes a tag as a string using the given coding
    pub fn set_tag_string(&mut self, ifd: ExifIfd, tag_id: u16, text: &str, coding: StrCoding) {
        let (tag_type, bytes) = encode_string(text, coding, self.byte_order);
        let item = self.tables[ifd.index()].entry_or_new(tag_id, tag_type);
        item.set_raw(tag_type, bytes.len() as u32, &bytes);
    }

    /// Reads one unsigned integer element of a tag
    pub fn tag_uint(&self, ifd: ExifIfd, tag_id: u16, index: u32) -> Option<u32> {
        let item = self.tables[ifd.index()].get(tag_id)?;
        item.read_uint_element(index, &*self.handler)
    }

    /// Writes one unsigned integer element, creating the tag or
    /// replacing its field type as needed; false if `tag_type` cannot
    /// hold an unsigned integer
    pub fn set_tag_uint(
        &mut self,
        ifd: ExifIfd,
        tag_id: u16,
        tag_type: TagType,
        index: u32,
        value: u32,
    ) -> bool {
        if !matches!(
            tag_type,
            TagType::Byte | TagType::Undefined | TagType::UShort | TagType::ULong
        ) {
            return false;
        }
        let handler = &*self.handler;
        let item = self.tables[ifd.index()].entry_or_new(tag_id, tag_type);
        if item.tag_type() != tag_type {
            item.set_raw(tag_type, index + 1, &[]);
        }
        item.write_uint_element(index, value, handler)
    }

    /// Reads one signed integer element of a tag
    pub fn tag_int(&self, ifd: ExifIfd, tag_id: u16, index: u32) -> Option<i32> {
        let item = self.tables[ifd.index()].get(tag_id)?;
        item.read_int_element(index, &*self.handler)
    }

    /// Writes one signed integer element; false if `tag_type` is not a
    /// signed integer type
    pub fn set_tag_int(
        &mut self,
        ifd: ExifIfd,
        tag_id: u16,
        tag_type: TagType,
        index: u32,
        value: i32,
    ) -> bool {
        if !matches!(tag_type, TagType::SByte | TagType::SShort | TagType::SLong) {
            return false;
        }
        let handler = &*self.handler;
        let item = self.tables[ifd.index()].entry_or_new(tag_id, tag_type);
        if item.tag_type() != tag_type {
            item.set_raw(tag_type, index + 1, &[]);
        }
        item.write_int_element(index, value, handler)
    }

    /// Reads one rational element of a tag
    pub fn tag_rational(&self, ifd: ExifIfd, tag_id: u16, index: u32) -> Option<ExifRational> {
        let item = self.tables[ifd.index()].get(tag_id)?;
        item.read_rational_element(index, &*self.handler)
    }

    /// Writes one rational element; false if `tag_type` is not a
    /// rational type
    pub fn set_tag_rational(
        &mut self,
        ifd: ExifIfd,
        tag_id: u16,
        tag_type: TagType,
        index: u32,
        value: ExifRational,
    ) -> bool {
        if !matches!(tag_type, TagType::URational | TagType::SRational) {
            return false;
        }
        let handler = &*self.handler;
        let item = self.tables[ifd.index()].entry_or_new(tag_id, tag_type);
        if item.tag_type() != tag_type {
            item.set_raw(tag_type, index + 1, &[]);
        }
        item.write_rational_element(index, value, handler)
    }

    /// Reads one floating point element of a tag
    pub fn tag_double(&self, ifd: ExifIfd, tag_id: u16, index: u32) -> Option<f64> {
        let item = self.tables[ifd.index()].get(tag_id)?;
        item.read_double_element(index, &*self.handler)
    }

    /// Writes one floating point element; false if `tag_type` is not a
    /// floating point type
    pub fn set_tag_double(
        &mut self,
        ifd: ExifIfd,
        tag_id: u16,
        tag_type: TagType,
        index: u32,
        value: f64,
    ) -> bool {
        if !matches!(tag_type, TagType::Float | TagType::Double) {
            return false;
        }
        let handler = &*self.handler;
        let item = self.tables[ifd.index()].entry_or_new(tag_id, tag_type);
        if item.tag_type() != tag_type {
            item.set_raw(tag_type, index + 1, &[]);
        }
        item.write_double_element(index, value, handler)
    }

    /// Reads a tag holding a full date and time string
    pub fn tag_date_time(&self, ifd: ExifIfd, tag_id: u16) -> Option<ExifDateTime> {
        let text = self.tag_string(ifd, tag_id, StrCoding::ascii())?;
        ExifDateTime::parse_date_time(text.trim())
    }

    /// Writes a tag as a full date and time string
    pub fn set_tag_date_time(&mut self, ifd: ExifIfd, tag_id: u16, value: &ExifDateTime) {
        let text = value.format_date_time();
        self.set_tag_string(ifd, tag_id, &text, StrCoding::ascii());
    }

    /// Reads a tag holding a date-only string
    pub fn tag_date(&self, ifd: ExifIfd, tag_id: u16) -> Option<ExifDateTime> {
        let text = self.tag_string(ifd, tag_id, StrCoding::ascii())?;
        ExifDateTime::parse_date(text.trim())
    }

    /// Writes a tag as a date-only string
    pub fn set_tag_date(&mut self, ifd: ExifIfd, tag_id: u16, value: &ExifDateTime) {
        let text = value.format_date();
        self.set_tag_string(ifd, tag_id, &text, StrCoding::ascii());
    }

    /// Reads a tag's raw value together with its field type and count
    pub fn tag_raw(&self, ifd: ExifIfd, tag_id: u16) -> Option<(TagType, u32, &[u8])> {
        let item = self.tables[ifd.index()].get(tag_id)?;
        Some((item.tag_type(), item.value_count(), item.value_bytes()))
    }

    /// Writes a tag's raw value; false if `bytes` does not match the
    /// byte count implied by type and count
    pub fn set_tag_raw(
        &mut self,
        ifd: ExifIfd,
        tag_id: u16,
        tag_type: TagType,
        value_count: u32,
        bytes: &[u8],
    ) -> bool {
        if tag_type.size() as usize * value_count as usize != bytes.len() {
            return false;
        }
        let item = self.tables[ifd.index()].entry_or_new(tag_id, tag_type);
        item.set_raw(tag_type, value_count, bytes);
        true
    }

    // ---- high-level date accessors -------------------------------------

    /// Date and time the picture was taken, with sub-second precision
    pub fn date_taken(&self) -> Option<ExifDateTime> {
        self.date_with_subsec(
            ExifIfd::PrivateData,
            tags::DATE_TIME_ORIGINAL,
            tags::SUB_SEC_TIME_ORIGINAL,
        )
    }

    pub fn set_date_taken(&mut self, value: &ExifDateTime) {
        self.set_date_with_subsec(
            ExifIfd::PrivateData,
            tags::DATE_TIME_ORIGINAL,
            tags::SUB_SEC_TIME_ORIGINAL,
            value,
        );
    }

    /// Date and time the picture was digitized
    pub fn date_digitized(&self) -> Option<ExifDateTime> {
        self.date_with_subsec(
            ExifIfd::PrivateData,
            tags::DATE_TIME_DIGITIZED,
            tags::SUB_SEC_TIME_DIGITIZED,
        )
    }

    pub fn set_date_digitized(&mut self, value: &ExifDateTime) {
        self.set_date_with_subsec(
            ExifIfd::PrivateData,
            tags::DATE_TIME_DIGITIZED,
            tags::SUB_SEC_TIME_DIGITIZED,
            value,
        );
    }

    /// Date and time the file was last changed
    ///
    /// The date lives in Primary Data while its sub-second companion
    /// lives in Private Data.
    pub fn date_changed(&self) -> Option<ExifDateTime> {
        let mut value = self.tag_date_time(ExifIfd::PrimaryData, tags::DATE_TIME)?;
        value.millisecond = self.subsec_milliseconds(tags::SUB_SEC_TIME).unwrap_or(0);
        Some(value)
    }

    pub fn set_date_changed(&mut self, value: &ExifDateTime) {
        self.set_tag_date_time(ExifIfd::PrimaryData, tags::DATE_TIME, value);
        self.set_subsec_milliseconds(tags::SUB_SEC_TIME, value.millisecond);
    }

    fn date_with_subsec(
        &self,
        ifd: ExifIfd,
        date_tag: u16,
        subsec_tag: u16,
    ) -> Option<ExifDateTime> {
        let mut value = self.tag_date_time(ifd, date_tag)?;
        value.millisecond = self.subsec_milliseconds(subsec_tag).unwrap_or(0);
        Some(value)
    }

    fn set_date_with_subsec(
        &mut self,
        ifd: ExifIfd,
        date_tag: u16,
        subsec_tag: u16,
        value: &ExifDateTime,
    ) {
        self.set_tag_date_time(ifd, date_tag, value);
        self.set_subsec_milliseconds(subsec_tag, value.millisecond);
    }

    /// Decodes a sub-second tag: the digits are a decimal fraction of a
    /// second, so "7" means 700 milliseconds
    fn subsec_milliseconds(&self, subsec_tag: u16) -> Option<u16> {
        let text = self.tag_string(ExifIfd::PrivateData, subsec_tag, StrCoding::ascii())?;
        let digits = text.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut milliseconds = 0u16;
        for position in 0..3 {
            let digit = digits.as_bytes().get(position).map_or(0, |b| (b - b'0') as u16);
            milliseconds = milliseconds * 10 + digit;
        }
        Some(milliseconds)
    }

    fn set_subsec_milliseconds(&mut self, subsec_tag: u16, milliseconds: u16) {
        if milliseconds == 0 {
            self.tables[ExifIfd::PrivateData.index()].remove(subsec_tag);
        } else {
            let text = format!("{:03}", milliseconds);
            self.set_tag_string(
                ExifIfd::PrivateData,
                subsec_tag,
                &text,
                StrCoding::ascii(),
            );
        }
    }

    // ---- high-level GPS accessors --------------------------------------

    /// Latitude as degrees, minutes, seconds plus 'N' or 'S'
    pub fn gps_latitude(&self) -> Option<GeoCoordinate> {
        self.gps_coordinate(tags::GPS_LATITUDE, tags::GPS_LATITUDE_REF, ['N', 'S'])
    }

    /// False if the cardinal point is not 'N' or 'S'
    pub fn set_gps_latitude(&mut self, value: &GeoCoordinate) -> bool {
        self.set_gps_coordinate(value, tags::GPS_LATITUDE, tags::GPS_LATITUDE_REF, ['N', 'S'])
    }

    /// Longitude as degrees, minutes, seconds plus 'E' or 'W'
    pub fn gps_longitude(&self) -> Option<GeoCoordinate> {
        self.gps_coordinate(tags::GPS_LONGITUDE, tags::GPS_LONGITUDE_REF, ['E', 'W'])
    }

    /// False if the cardinal point is not 'E' or 'W'
    pub fn set_gps_longitude(&mut self, value: &GeoCoordinate) -> bool {
        self.set_gps_coordinate(
            value,
            tags::GPS_LONGITUDE,
            tags::GPS_LONGITUDE_REF,
            ['E', 'W'],
        )
    }

    fn gps_coordinate(
        &self,
        value_tag: u16,
        ref_tag: u16,
        cardinals: [char; 2],
    ) -> Option<GeoCoordinate> {
        let reference = self.tag_string(ExifIfd::GpsInfoData, ref_tag, StrCoding::ascii())?;
        let cardinal = reference.trim().chars().next()?;
        if !cardinals.contains(&cardinal) {
            return None;
        }
        let degrees = self.tag_rational(ExifIfd::GpsInfoData, value_tag, 0)?;
        let minutes = self.tag_rational(ExifIfd::GpsInfoData, value_tag, 1)?;
        let seconds = self.tag_rational(ExifIfd::GpsInfoData, value_tag, 2)?;
        Some(GeoCoordinate {
            degrees: degrees.to_decimal(),
            minutes: minutes.to_decimal(),
            seconds: seconds.to_decimal(),
            cardinal,
        })
    }

    fn set_gps_coordinate(
        &mut self,
        value: &GeoCoordinate,
        value_tag: u16,
        ref_tag: u16,
        cardinals: [char; 2],
    ) -> bool {
        if !cardinals.contains(&value.cardinal) {
            return false;
        }
        let mut reference = String::new();
        reference.push(value.cardinal);
        self.set_tag_string(ExifIfd::GpsInfoData, ref_tag, &reference, StrCoding::ascii());
        // degrees and minutes are whole numbers, seconds carry two
        // decimal places
        let elements = [
            ExifRational::new(value.degrees as u32, 1),
            ExifRational::new(value.minutes as u32, 1),
            ExifRational::new((value.seconds * 100.0).round() as u32, 100),
        ];
        for (index, element) in elements.iter().enumerate() {
            self.set_tag_rational(
                ExifIfd::GpsInfoData,
                value_tag,
                TagType::URational,
                index as u32,
                *element,
            );
        }
        true
    }

    /// Altitude in meters, negative below sea level
    pub fn gps_altitude(&self) -> Option<f64> {
        let altitude = self
            .tag_rational(ExifIfd::GpsInfoData, tags::GPS_ALTITUDE, 0)?
            .to_decimal();
        let below = self
            .tag_uint(ExifIfd::GpsInfoData, tags::GPS_ALTITUDE_REF, 0)
            .map_or(false, |reference| reference == 1);
        Some(if below { -altitude } else { altitude })
    }

    pub fn set_gps_altitude(&mut self, meters: f64) {
        let reference = if meters < 0.0 { 1 } else { 0 };
        self.set_tag_uint(
            ExifIfd::GpsInfoData,
            tags::GPS_ALTITUDE_REF,
            TagType::Byte,
            0,
            reference,
        );
        self.set_tag_rational(
            ExifIfd::GpsInfoData,
            tags::GPS_ALTITUDE,
            TagType::URational,
            0,
            ExifRational::from_decimal(meters.abs()),
        );
    }

    /// UTC date and time of the GPS fix
    pub fn gps_date_time_stamp(&self) -> Option<ExifDateTime> {
        let mut value = self.tag_date(ExifIfd::GpsInfoData, tags::GPS_DATE_STAMP)?;
        let hour = self.tag_rational(ExifIfd::GpsInfoData, tags::GPS_TIME_STAMP, 0)?;
        let minute = self.tag_rational(ExifIfd::GpsInfoData, tags::GPS_TIME_STAMP, 1)?;
        let second = self.tag_rational(ExifIfd::GpsInfoData, tags::GPS_TIME_STAMP, 2)?;
        value.hour = hour.to_decimal() as u8;
        value.minute = minute.to_decimal() as u8;
        value.second = second.to_decimal() as u8;
        Some(value)
    }

    pub fn set_gps_date_time_stamp(&mut self, value: &ExifDateTime) {
        self.set_tag_date(ExifIfd::GpsInfoData, tags::GPS_DATE_STAMP, value);
        let elements = [
            ExifRational::new(value.hour as u32, 1),
            ExifRational::new(value.minute as u32, 1),
            ExifRational::new(value.second as u32, 1),
        ];
        for (index, element) in elements.iter().enumerate() {
            self.set_tag_rational(
                ExifIfd::GpsInfoData,
                tags::GPS_TIME_STAMP,
                TagType::URational,
                index as u32,
                *element,
            );
        }
    }

    // ---- structure queries and removal ---------------------------------

    pub fn tag_exists(&self, ifd: ExifIfd, tag_id: u16) -> bool {
        self.tables[ifd.index()].contains(tag_id)
    }

    pub fn ifd_exists(&self, ifd: ExifIfd) -> bool {
        !self.tables[ifd.index()].is_empty()
    }

    /// Removes a tag; false if it was not present
    pub fn remove_tag(&mut self, ifd: ExifIfd, tag_id: u16) -> bool {
        self.tables[ifd.index()].remove(tag_id)
    }

    pub fn remove_all_tags_from_ifd(&mut self, ifd: ExifIfd) {
        self.tables[ifd.index()].clear();
    }

    /// Drops every tag table and the thumbnail
    pub fn remove_all_tags(&mut self) {
        for table in self.tables.iter_mut() {
            table.clear();
        }
        self.thumbnail = None;
    }

    /// Whether a metadata block is carried in the image
    ///
    /// The EXIF answer reflects the current tables; the others reflect
    /// what the source scan found minus explicit removals.
    pub fn image_file_block_exists(&self, block: ImageFileBlock) -> bool {
        match block {
            ImageFileBlock::Exif => {
                self.tables.iter().any(|table| !table.is_empty()) || self.thumbnail.is_some()
            }
            _ => self.block_status[block.index()] == BlockStatus::Existent,
        }
    }

    /// Marks a metadata block for removal on the next save
    ///
    /// The EXIF block is emptied directly; the auxiliary blocks are
    /// flagged and skipped during the save copy-through.
    pub fn remove_image_file_block(&mut self, block: ImageFileBlock) {
        match block {
            ImageFileBlock::Exif => {
                self.remove_all_tags();
            }
            _ => self.block_status[block.index()] = BlockStatus::Removed,
        }
    }

    // ---- tag enumeration -----------------------------------------------

    /// Starts walking one table; the id list is snapshotted, so tags
    /// may be removed while enumerating
    pub fn init_tag_enumeration(&mut self, ifd: ExifIfd) {
        self.enumeration = Some(TagEnumeration {
            ifd,
            tag_ids: self.tables[ifd.index()].tag_ids(),
            position: 0,
        });
    }

    /// Next tag of the current enumeration, None when exhausted
    pub fn enumerate_next_tag(&mut self) -> Option<(ExifIfd, u16)> {
        let state = self.enumeration.as_mut()?;
        let tag_id = *state.tag_ids.get(state.position)?;
        state.position += 1;
        Some((state.ifd, tag_id))
    }

    /// Read-only walk over the tags of one table
    pub fn tags_in(&self, ifd: ExifIfd) -> impl Iterator<Item = &TagItem> {
        self.tables[ifd.index()].iter()
    }

    // ---- thumbnail -----------------------------------------------------

    pub fn thumbnail_image(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    pub fn set_thumbnail_image(&mut self, image: Vec<u8>) {
        self.thumbnail = Some(image);
    }

    /// Drops the thumbnail image, optionally together with all other
    /// tags of the Thumbnail Data IFD
    pub fn remove_thumbnail_image(&mut self, also_remove_tags: bool) {
        self.thumbnail = None;
        let table = &mut self.tables[ExifIfd::ThumbnailData.index()];
        table.remove(tags::THUMBNAIL_OFFSET);
        table.remove(tags::THUMBNAIL_LENGTH);
        if also_remove_tags {
            table.clear();
        }
    }

    // ---- bulk replacement ----------------------------------------------

    /// Replaces this object's tags with deep copies of another object's
    ///
    /// Non-TIFF images take over everything including the byte order.
    /// A TIFF destination keeps its own structural tags (image layout,
    /// strip geometry, embedded XMP/IPTC) and converts copied values to
    /// its established byte order.
    pub fn replace_all_tags_by(&mut self, other: &ExifData) {
        if self.image_type != ImageFormat::Tiff {
            self.byte_order = other.byte_order;
            self.handler = other.byte_order.create_handler();
            self.tables = other.tables.clone();
            self.thumbnail = other.thumbnail.clone();
            self.maker_note_original_offset = other.maker_note_original_offset;
            return;
        }

        let convert = self.byte_order != other.byte_order;
        for ifd in ExifIfd::ALL {
            let table = &mut self.tables[ifd.index()];
            if ifd == ExifIfd::PrimaryData {
                table.retain(|tag_id, _| is_tiff_internal(*tag_id));
            } else {
                table.clear();
            }
            for item in other.tables[ifd.index()].iter() {
                if ifd == ExifIfd::PrimaryData && is_tiff_internal(item.tag_id()) {
                    continue;
                }
                let mut copy = item.clone();
                if convert {
                    copy.swap_byte_order();
                }
                self.tables[ifd.index()].insert(copy);
            }
        }
        self.maker_note_original_offset = other.maker_note_original_offset;
    }
}

/// Tags a TIFF container owns structurally: image geometry, strip and
/// tile placement, and metadata embedded as plain tags
fn is_tiff_internal(tag_id: u16) -> bool {
    tags::TIFF_INTERNAL.contains(&tag_id)
}
