use crate::model::{OutcomeRow, OutcomeStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketSummary {
    pub files: usize,
    /// Sum of known sizes.
    pub bytes: u64,
    pub kept: usize,
    pub archived: usize,
    pub previewed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl BucketSummary {
    fn add(&mut self, outcome: &OutcomeRow) {
        self.files += 1;
        self.bytes += outcome.plan.size.unwrap_or(0);
        match outcome.status {
            OutcomeStatus::Kept => self.kept += 1,
            OutcomeStatus::Copied | OutcomeStatus::Moved => self.archived += 1,
            OutcomeStatus::WouldCopy | OutcomeStatus::WouldMove => self.previewed += 1,
            OutcomeStatus::SkippedByConfirmation => self.skipped += 1,
            OutcomeStatus::Error => self.errors += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Keyed by `YYYY-MM`, oldest first.
    pub buckets: BTreeMap<String, BucketSummary>,
    pub totals: BucketSummary,
}

impl Summary {
    pub fn has_errors(&self) -> bool {
        self.totals.errors > 0
    }
}

pub fn summarize(outcomes: &[OutcomeRow]) -> Summary {
    let mut summary = Summary::default();
    for outcome in outcomes {
        summary
            .buckets
            .entry(outcome.plan.year_month.clone())
            .or_default()
            .add(outcome);
        summary.totals.add(outcome);
    }
    summary
}
