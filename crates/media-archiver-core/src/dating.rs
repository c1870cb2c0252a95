use crate::metadata::CaptureTimestampReader;
use crate::model::{DateSource, MediaFile, ResolvedDate};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Derives one authoritative timestamp per file: embedded capture time when
/// the reader finds one, otherwise the filesystem modification time.
pub struct DateResolver<'a> {
    reader: &'a dyn CaptureTimestampReader,
}

impl<'a> DateResolver<'a> {
    pub fn new(reader: &'a dyn CaptureTimestampReader) -> Self {
        Self { reader }
    }

    /// Total: reader errors and panics are swallowed and the file falls back
    /// to its modification time.
    pub fn resolve(&self, file: &MediaFile) -> ResolvedDate {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.reader.read_capture_timestamp(&file.path)
        }));

        match attempt {
            Ok(Ok(Some(timestamp))) => {
                return ResolvedDate {
                    timestamp,
                    source: DateSource::Metadata,
                }
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => debug!("Metadata unavailable for {}: {}", file.path.display(), e),
            Err(_) => debug!("Metadata reader panicked on {}", file.path.display()),
        }

        ResolvedDate {
            timestamp: file.modified,
            source: DateSource::FilesystemFallback,
        }
    }
}
