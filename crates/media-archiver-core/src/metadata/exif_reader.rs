use super::{parse_capture_timestamp, CaptureTimestampReader};
use crate::error::Error;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Reads `DateTimeOriginal` from the primary image of any container the
/// `exif` crate understands (JPEG, TIFF, HEIF, PNG, WebP).
#[derive(Debug, Default)]
pub struct ExifReader;

impl ExifReader {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureTimestampReader for ExifReader {
    fn read_capture_timestamp(&self, path: &Path) -> Result<Option<NaiveDateTime>, Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(None),
            Err(e) => return Err(Error::Metadata(format!("{}: {}", path.display(), e))),
        };

        let field = match exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
            Some(field) => field,
            None => {
                trace!("No DateTimeOriginal in {}", path.display());
                return Ok(None);
            }
        };

        let raw = match &field.value {
            Value::Ascii(values) => values.first(),
            _ => None,
        };

        Ok(raw
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(parse_capture_timestamp))
    }
}
