pub mod exif_reader;

pub use exif_reader::ExifReader;

use crate::error::Error;
use chrono::NaiveDateTime;
use std::path::Path;

/// Layout of embedded capture timestamps, e.g. `2021:07:04 12:30:00`.
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Capability for reading an embedded "original capture" timestamp.
///
/// `Ok(None)` means the file simply carries no usable timestamp. Callers are
/// expected to fall back to filesystem dates on both `Ok(None)` and `Err`.
pub trait CaptureTimestampReader: Send + Sync {
    fn read_capture_timestamp(&self, path: &Path) -> Result<Option<NaiveDateTime>, Error>;
}

/// Reader that never finds embedded metadata, so every file is dated by its
/// modification time.
pub struct NoMetadata;

impl CaptureTimestampReader for NoMetadata {
    fn read_capture_timestamp(&self, _path: &Path) -> Result<Option<NaiveDateTime>, Error> {
        Ok(None)
    }
}

/// Parse a capture timestamp. Anything not exactly `YYYY:MM:DD HH:MM:SS`
/// (zero-padded, no fractional seconds, no zone) yields `None`.
pub fn parse_capture_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim_end_matches('\0');
    if !has_capture_shape(raw) {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, CAPTURE_TIMESTAMP_FORMAT).ok()
}

fn has_capture_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() != 19 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b':',
        10 => *b == b' ',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    })
}
