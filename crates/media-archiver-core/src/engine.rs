use crate::config::ArchiveSettings;
use crate::cutoff::cutoff;
use crate::dating::DateResolver;
use crate::error::Error;
use crate::executor::{ConfirmationGate, Executor};
use crate::metadata::{CaptureTimestampReader, ExifReader, NoMetadata};
use crate::model::{ExecutionMode, OutcomeRow, PlanRow, RetentionCutoff};
use crate::plan::PlanBuilder;
use crate::progress::ProgressReporter;
use crate::scanner::{self, DiscoveryOptions};
use crate::summary::{summarize, Summary};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

pub struct ArchiveEngine {
    settings: ArchiveSettings,
    reader: Box<dyn CaptureTimestampReader>,
}

#[derive(Debug)]
pub struct PlanRun {
    pub cutoff: RetentionCutoff,
    pub rows: Vec<PlanRow>,
}

#[derive(Debug)]
pub struct RunResult {
    pub cutoff: RetentionCutoff,
    pub plan: Vec<PlanRow>,
    pub outcomes: Vec<OutcomeRow>,
    pub summary: Summary,
}

impl ArchiveEngine {
    pub fn new(settings: ArchiveSettings) -> Self {
        let reader: Box<dyn CaptureTimestampReader> = if settings.use_metadata {
            Box::new(ExifReader::new())
        } else {
            Box::new(NoMetadata)
        };
        Self { settings, reader }
    }

    /// Replace the metadata capability chosen from the settings.
    pub fn with_reader(mut self, reader: Box<dyn CaptureTimestampReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn settings(&self) -> &ArchiveSettings {
        &self.settings
    }

    /// Discover files and build the plan. Nothing on disk is modified.
    pub fn plan(
        &self,
        now: NaiveDateTime,
        reporter: &dyn ProgressReporter,
    ) -> Result<PlanRun, Error> {
        let settings = &self.settings;
        info!(
            "Planning {} -> {} (keep {} months, {:?})",
            settings.source_dir.display(),
            settings.archive_root.display(),
            settings.keep_months,
            settings.transfer,
        );

        reporter.on_discover_start();
        let discover_start = Instant::now();
        let options = DiscoveryOptions {
            extensions: settings.extensions.clone(),
            ignore_patterns: settings.ignore_patterns.clone(),
            recursive: settings.recursive,
            exclude_dir: nested_archive(&settings.source_dir, &settings.archive_root),
        };
        let files = scanner::discover(&settings.source_dir, &options)?;
        let discover_secs = discover_start.elapsed().as_secs_f64();
        debug!("Discovered {} files in {:.2}s", files.len(), discover_secs);
        reporter.on_discover_complete(files.len(), discover_secs);

        let cutoff = cutoff(settings.keep_months, now);
        info!("Retention cutoff: {}", cutoff.boundary);

        let planner = PlanBuilder::new(
            DateResolver::new(&*self.reader),
            settings.archive_root.clone(),
            settings.transfer,
        );
        let rows = planner.build(&files, &cutoff, reporter);

        Ok(PlanRun { cutoff, rows })
    }

    /// Plan, execute, and summarise one run.
    pub fn run(
        &self,
        now: NaiveDateTime,
        mode: ExecutionMode,
        gate: &dyn ConfirmationGate,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunResult, Error> {
        let PlanRun { cutoff, rows } = self.plan(now, reporter)?;
        let outcomes = Executor::new(gate, reporter).execute(&rows, mode);
        let summary = summarize(&outcomes);

        info!(
            "{} files: {} kept, {} archived, {} previewed, {} skipped, {} errors",
            summary.totals.files,
            summary.totals.kept,
            summary.totals.archived,
            summary.totals.previewed,
            summary.totals.skipped,
            summary.totals.errors,
        );

        Ok(RunResult {
            cutoff,
            plan: rows,
            outcomes,
            summary,
        })
    }
}

/// The archive root, when it sits inside the source tree.
fn nested_archive(source_dir: &Path, archive_root: &Path) -> Option<PathBuf> {
    let source = fs::canonicalize(source_dir).unwrap_or_else(|_| source_dir.to_path_buf());
    let archive = fs::canonicalize(archive_root).unwrap_or_else(|_| archive_root.to_path_buf());
    if archive.starts_with(&source) {
        // Walk entries are rooted at source_dir as given, not canonicalized.
        let relative = archive.strip_prefix(&source).ok()?;
        Some(source_dir.join(relative))
    } else {
        None
    }
}
