//! Week window generation

use agroprog_core::{WeekWindow, DAYS_PER_WEEK};
use chrono::{Duration, NaiveDate};

/// Build `weeks` contiguous 7-day windows starting on `start`.
///
/// Window `i` (1-based) starts `7 × (i − 1)` days after `start`.
pub fn generate_calendar(start: NaiveDate, weeks: u32) -> Vec<WeekWindow> {
    (1..=weeks)
        .map(|index| {
            let offset = DAYS_PER_WEEK * i64::from(index - 1);
            WeekWindow::new(index, start + Duration::days(offset))
        })
        .collect()
}
