use crate::model::RetentionCutoff;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Compute the retention boundary for `keep_months`, counting the month of
/// `now` as the first retained month.
///
/// Uses calendar-month arithmetic so month lengths and leap years do not
/// shift the boundary. `keep_months` is expected to be validated by the
/// caller; zero is treated like one.
pub fn cutoff(keep_months: u32, now: NaiveDateTime) -> RetentionCutoff {
    let month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .unwrap_or_else(|| now.date());
    let shift = Months::new(keep_months.saturating_sub(1));
    let boundary_date = month_start.checked_sub_months(shift).unwrap_or(NaiveDate::MIN);

    RetentionCutoff {
        keep_months,
        boundary: boundary_date.and_time(NaiveTime::MIN),
    }
}
