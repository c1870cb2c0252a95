use chrono::{Datelike, NaiveDateTime};
use std::fmt;
use std::path::PathBuf;

/// A file discovered in the source directory. Identity is the source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Lowercased, without the leading dot. Empty when the name has none.
    pub extension: String,
    pub modified: NaiveDateTime,
    pub size: Option<u64>,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, modified: NaiveDateTime, size: Option<u64>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = normalize_extension(
            &path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        Self {
            path,
            file_name,
            extension,
            modified,
            size,
        }
    }
}

/// Strip a leading dot and lowercase, so `".JPG"` and `"jpg"` compare equal.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateSource {
    Metadata,
    FilesystemFallback,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            DateSource::Metadata => "metadata",
            DateSource::FilesystemFallback => "filesystem-fallback",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub timestamp: NaiveDateTime,
    pub source: DateSource,
}

impl ResolvedDate {
    /// `YYYY-MM` bucket used for archive folders and summaries.
    pub fn year_month(&self) -> String {
        format!("{:04}-{:02}", self.timestamp.year(), self.timestamp.month())
    }

    pub fn year(&self) -> String {
        format!("{:04}", self.timestamp.year())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionCutoff {
    pub keep_months: u32,
    pub boundary: NaiveDateTime,
}

impl RetentionCutoff {
    /// Strictly earlier than the boundary means archivable.
    pub fn is_archivable(&self, timestamp: NaiveDateTime) -> bool {
        timestamp < self.boundary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    #[default]
    DryRun,
    Apply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlannedAction {
    Keep,
    CopyToArchive,
    MoveToArchive,
}

impl PlannedAction {
    pub fn decide(archivable: bool, transfer: TransferMode) -> Self {
        match (archivable, transfer) {
            (false, _) => PlannedAction::Keep,
            (true, TransferMode::Copy) => PlannedAction::CopyToArchive,
            (true, TransferMode::Move) => PlannedAction::MoveToArchive,
        }
    }
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlannedAction::Keep => "Keep",
            PlannedAction::CopyToArchive => "CopyToArchive",
            PlannedAction::MoveToArchive => "MoveToArchive",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Kept,
    WouldCopy,
    WouldMove,
    Copied,
    Moved,
    SkippedByConfirmation,
    Error,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeStatus::Kept => "Kept",
            OutcomeStatus::WouldCopy => "WouldCopy",
            OutcomeStatus::WouldMove => "WouldMove",
            OutcomeStatus::Copied => "Copied",
            OutcomeStatus::Moved => "Moved",
            OutcomeStatus::SkippedByConfirmation => "SkippedByConfirmation",
            OutcomeStatus::Error => "Error",
        };
        f.pad(label)
    }
}

/// One disposition decision per discovered file. Never mutated after planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    pub source_path: PathBuf,
    pub name: String,
    pub extension: String,
    pub size: Option<u64>,
    pub resolved: ResolvedDate,
    pub year_month: String,
    pub cutoff: NaiveDateTime,
    pub archivable: bool,
    pub planned_action: PlannedAction,
    /// `archive_root/YYYY/YYYY-MM`, derived at plan time and not touched on disk.
    pub target_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRow {
    pub plan: PlanRow,
    pub target_path: Option<PathBuf>,
    pub status: OutcomeStatus,
    pub note: Option<String>,
}
