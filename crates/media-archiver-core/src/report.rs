//! Flat CSV records for plan and outcome rows.
//!
//! Column lists are fixed. Optional values are written as empty fields so
//! every row of every run has the same shape.

use crate::error::Error;
use crate::model::{OutcomeRow, PlanRow};
use chrono::NaiveDateTime;
use csv::Writer;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PLAN_COLUMNS: [&str; 10] = [
    "SourcePath",
    "Name",
    "Extension",
    "ResolvedDate",
    "DateSource",
    "YearMonth",
    "Cutoff",
    "Archivable",
    "PlannedAction",
    "TargetDir",
];

pub const OUTCOME_COLUMNS: [&str; 13] = [
    "SourcePath",
    "Name",
    "Extension",
    "ResolvedDate",
    "DateSource",
    "YearMonth",
    "Cutoff",
    "Archivable",
    "PlannedAction",
    "TargetDir",
    "TargetPath",
    "Result",
    "Note",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn plan_fields(row: &PlanRow) -> Vec<String> {
    vec![
        row.source_path.to_string_lossy().into_owned(),
        row.name.clone(),
        row.extension.clone(),
        format_timestamp(&row.resolved.timestamp),
        row.resolved.source.to_string(),
        row.year_month.clone(),
        format_timestamp(&row.cutoff),
        row.archivable.to_string(),
        row.planned_action.to_string(),
        row.target_dir.to_string_lossy().into_owned(),
    ]
}

fn outcome_fields(outcome: &OutcomeRow) -> Vec<String> {
    let mut fields = plan_fields(&outcome.plan);
    fields.push(
        outcome
            .target_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    fields.push(outcome.status.to_string());
    fields.push(outcome.note.clone().unwrap_or_default());
    fields
}

pub fn write_plan<W: Write>(writer: W, rows: &[PlanRow]) -> Result<(), Error> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(PLAN_COLUMNS)?;
    for row in rows {
        csv.write_record(plan_fields(row))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_outcomes<W: Write>(writer: W, outcomes: &[OutcomeRow]) -> Result<(), Error> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(OUTCOME_COLUMNS)?;
    for outcome in outcomes {
        csv.write_record(outcome_fields(outcome))?;
    }
    csv.flush()?;
    Ok(())
}

/// File locations for one run's reports, stamped with the run start time.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub plan: PathBuf,
    pub outcome: PathBuf,
}

impl ReportPaths {
    pub fn for_run(reports_dir: &Path, started: NaiveDateTime) -> Self {
        let stamp = started.format("%Y%m%d-%H%M%S");
        Self {
            plan: reports_dir.join(format!("plan-{}.csv", stamp)),
            outcome: reports_dir.join(format!("outcome-{}.csv", stamp)),
        }
    }

    pub fn write_plan(&self, rows: &[PlanRow]) -> Result<(), Error> {
        write_to_file(&self.plan, |file| write_plan(file, rows))?;
        info!("Plan written to {}", self.plan.display());
        Ok(())
    }

    pub fn write_outcomes(&self, outcomes: &[OutcomeRow]) -> Result<(), Error> {
        write_to_file(&self.outcome, |file| write_outcomes(file, outcomes))?;
        info!("Outcomes written to {}", self.outcome.display());
        Ok(())
    }
}

fn write_to_file<F>(path: &Path, write: F) -> Result<(), Error>
where
    F: FnOnce(File) -> Result<(), Error>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write(File::create(path)?)
}
