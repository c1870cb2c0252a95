use crate::model::OutcomeRow;

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif bars; tests and non-interactive
/// callers use [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_discover_start(&self) {}
    fn on_discover_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_plan_start(&self, _total_files: usize) {}
    fn on_plan_progress(&self, _files_planned: usize, _total_files: usize) {}
    fn on_plan_complete(&self, _rows: usize) {}
    fn on_execute_start(&self, _total_rows: usize) {}
    fn on_execute_progress(&self, _rows_done: usize, _total_rows: usize, _outcome: &OutcomeRow) {}
    fn on_execute_complete(&self, _rows: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
