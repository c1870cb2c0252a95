use crate::collision;
use crate::error::Error;
use crate::model::{ExecutionMode, OutcomeRow, OutcomeStatus, PlanRow, PlannedAction};
use crate::progress::ProgressReporter;
use crate::transfer;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Per-file approval for destructive actions in apply mode.
pub trait ConfirmationGate {
    fn confirm(&self, source: &Path, description: &str) -> bool;
}

/// Approves everything. Used for non-interactive apply runs.
pub struct AlwaysApprove;

impl ConfirmationGate for AlwaysApprove {
    fn confirm(&self, _source: &Path, _description: &str) -> bool {
        true
    }
}

/// Declines everything.
pub struct AlwaysDecline;

impl ConfirmationGate for AlwaysDecline {
    fn confirm(&self, _source: &Path, _description: &str) -> bool {
        false
    }
}

/// Applies a plan row by row. This is the only place that mutates the
/// filesystem. Rows are processed strictly in order: destination names are
/// resolved against the archive as left by the previous rows.
pub struct Executor<'a> {
    gate: &'a dyn ConfirmationGate,
    reporter: &'a dyn ProgressReporter,
    collision_limit: u32,
}

impl<'a> Executor<'a> {
    pub fn new(gate: &'a dyn ConfirmationGate, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            gate,
            reporter,
            collision_limit: collision::MAX_COLLISION_PROBES,
        }
    }

    /// Cap the `stem (n).ext` probes per file.
    pub fn with_collision_limit(mut self, limit: u32) -> Self {
        self.collision_limit = limit;
        self
    }

    /// Exactly one outcome per plan row, in plan order. A failing row never
    /// stops the rows after it.
    pub fn execute(&self, plan: &[PlanRow], mode: ExecutionMode) -> Vec<OutcomeRow> {
        let start = Instant::now();
        self.reporter.on_execute_start(plan.len());

        // Destinations handed out during this run. In dry-run nothing lands on
        // disk, so without this two same-named files would predict one path.
        let mut claimed: HashSet<PathBuf> = HashSet::new();
        let mut outcomes = Vec::with_capacity(plan.len());

        for (index, row) in plan.iter().enumerate() {
            let outcome = self.execute_row(row, mode, &mut claimed);
            self.reporter
                .on_execute_progress(index + 1, plan.len(), &outcome);
            outcomes.push(outcome);
        }

        let duration = start.elapsed().as_secs_f64();
        info!(
            "Executed {} plan rows in {:.2}s ({:?})",
            outcomes.len(),
            duration,
            mode
        );
        self.reporter.on_execute_complete(outcomes.len(), duration);
        outcomes
    }

    fn execute_row(
        &self,
        row: &PlanRow,
        mode: ExecutionMode,
        claimed: &mut HashSet<PathBuf>,
    ) -> OutcomeRow {
        if row.planned_action == PlannedAction::Keep {
            return outcome(row, None, OutcomeStatus::Kept, None);
        }

        if mode == ExecutionMode::Apply {
            if let Err(e) = fs::create_dir_all(&row.target_dir) {
                let err = Error::Io(e);
                error!(
                    "Failed to create {}: {}",
                    row.target_dir.display(),
                    err
                );
                return failed(row, None, &err);
            }
        }

        // The real file name, not the lossy display string, so non-UTF-8
        // names survive the transfer byte for byte.
        let desired_name = row
            .source_path
            .file_name()
            .unwrap_or_else(|| OsStr::new(&row.name));
        let target = match collision::resolve_destination_within(
            &row.target_dir,
            desired_name,
            self.collision_limit,
            |p| claimed.contains(p),
        ) {
            Ok(target) => target,
            Err(err) => {
                error!("{}: {}", row.source_path.display(), err);
                return failed(row, None, &err);
            }
        };

        if mode == ExecutionMode::DryRun {
            let status = match row.planned_action {
                PlannedAction::MoveToArchive => OutcomeStatus::WouldMove,
                _ => OutcomeStatus::WouldCopy,
            };
            debug!(
                "{}: {} -> {}",
                status,
                row.source_path.display(),
                target.display()
            );
            claimed.insert(target.clone());
            return outcome(row, Some(target), status, None);
        }

        let verb = match row.planned_action {
            PlannedAction::MoveToArchive => "Move",
            _ => "Copy",
        };
        let description = format!(
            "{} {} to {}",
            verb,
            row.source_path.display(),
            target.display()
        );
        if !self.gate.confirm(&row.source_path, &description) {
            info!("Skipped by confirmation: {}", row.source_path.display());
            return outcome(row, Some(target), OutcomeStatus::SkippedByConfirmation, None);
        }

        let result = match row.planned_action {
            PlannedAction::MoveToArchive => transfer::move_no_clobber(&row.source_path, &target)
                .map(|_| OutcomeStatus::Moved),
            _ => transfer::copy_no_clobber(&row.source_path, &target)
                .map(|_| OutcomeStatus::Copied),
        };

        match result {
            Ok(status) => {
                debug!("{}", description);
                claimed.insert(target.clone());
                outcome(row, Some(target), status, None)
            }
            Err(err) => {
                warn!("{} failed: {}", description, err);
                failed(row, Some(target), &err)
            }
        }
    }
}

fn outcome(
    row: &PlanRow,
    target_path: Option<PathBuf>,
    status: OutcomeStatus,
    note: Option<String>,
) -> OutcomeRow {
    OutcomeRow {
        plan: row.clone(),
        target_path,
        status,
        note,
    }
}

fn failed(row: &PlanRow, target_path: Option<PathBuf>, err: &Error) -> OutcomeRow {
    outcome(row, target_path, OutcomeStatus::Error, Some(err.to_string()))
}
