use crate::dating::DateResolver;
use crate::model::{MediaFile, PlanRow, PlannedAction, ResolvedDate, RetentionCutoff, TransferMode};
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns discovered files into plan rows. Planning reads file metadata
/// through the resolver but never creates or probes archive directories.
pub struct PlanBuilder<'a> {
    resolver: DateResolver<'a>,
    archive_root: PathBuf,
    transfer: TransferMode,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(
        resolver: DateResolver<'a>,
        archive_root: impl Into<PathBuf>,
        transfer: TransferMode,
    ) -> Self {
        Self {
            resolver,
            archive_root: archive_root.into(),
            transfer,
        }
    }

    /// One row per input file, in input order.
    pub fn build(
        &self,
        files: &[MediaFile],
        cutoff: &RetentionCutoff,
        reporter: &dyn ProgressReporter,
    ) -> Vec<PlanRow> {
        reporter.on_plan_start(files.len());

        let mut rows = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let row = self.plan_file(file, cutoff);
            debug!(
                "{} -> {} ({}, {}, {})",
                file.path.display(),
                row.planned_action,
                row.year_month,
                row.resolved.source,
                row.resolved.timestamp,
            );
            rows.push(row);
            reporter.on_plan_progress(index + 1, files.len());
        }

        reporter.on_plan_complete(rows.len());
        rows
    }

    fn plan_file(&self, file: &MediaFile, cutoff: &RetentionCutoff) -> PlanRow {
        let resolved = self.resolver.resolve(file);
        let archivable = cutoff.is_archivable(resolved.timestamp);

        PlanRow {
            source_path: file.path.clone(),
            name: file.file_name.clone(),
            extension: file.extension.clone(),
            size: file.size,
            year_month: resolved.year_month(),
            cutoff: cutoff.boundary,
            archivable,
            planned_action: PlannedAction::decide(archivable, self.transfer),
            target_dir: target_directory(&self.archive_root, &resolved),
            resolved,
        }
    }
}

/// `archive_root/YYYY/YYYY-MM` for the resolved date.
pub fn target_directory(archive_root: &Path, resolved: &ResolvedDate) -> PathBuf {
    archive_root.join(resolved.year()).join(resolved.year_month())
}
