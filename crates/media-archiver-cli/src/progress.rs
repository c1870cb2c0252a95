use indicatif::{ProgressBar, ProgressStyle};
use media_archiver_core::{OutcomeRow, ProgressReporter};
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Discovery: spinner (file count unknown upfront)
/// - Planning and execution: bars sized to the file/row count
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn counting_bar(total: usize, label: &str) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(&format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} {{msg}}",
            label
        )) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_discover_start(&self) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICK_CHARS));
        }
        pb.set_message("Scanning source folder...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_discover_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} media files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_plan_start(&self, total_files: usize) {
        self.set_bar(Self::counting_bar(total_files, "Planning"));
    }

    fn on_plan_progress(&self, files_planned: usize, _total_files: usize) {
        self.with_bar(|pb| pb.set_position(files_planned as u64));
    }

    fn on_plan_complete(&self, rows: usize) {
        self.finish_bar();
        eprintln!("  \x1b[32m✓\x1b[0m Plan complete: {} rows", rows);
    }

    fn on_execute_start(&self, total_rows: usize) {
        self.set_bar(Self::counting_bar(total_rows, "Archiving"));
    }

    fn on_execute_progress(&self, rows_done: usize, _total_rows: usize, outcome: &OutcomeRow) {
        self.with_bar(|pb| {
            pb.set_position(rows_done as u64);
            pb.set_message(outcome.plan.name.clone());
        });
    }

    fn on_execute_complete(&self, rows: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Execution complete: {} rows in {:.2}s",
            rows, duration_secs
        );
    }
}
