//! Day-bucketed activity for the contribution-style heat-map.
//!
//! Buckets are recomputed from the full entry list on every call. Entries are
//! grouped by the local calendar date of their start time in one pass, then
//! each day of the window is a map lookup. An entry that starts at 23:59:59.999
//! counts towards that day even if it ends on the next one.

use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::TimeEntry;

const HOUR_SECS: u64 = 3600;

/// Which run of days the heat-map covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum ActivityWindow {
    /// `days` consecutive days ending on the window's end day.
    Trailing { days: u32 },
    /// `weeks` whole Sunday-to-Saturday weeks, the last one containing the
    /// end day. Days after the end day come back flagged as future.
    Weeks { weeks: u32 },
}

impl Default for ActivityWindow {
    fn default() -> Self {
        ActivityWindow::Trailing { days: 84 }
    }
}

impl ActivityWindow {
    pub fn len_days(&self) -> u32 {
        match *self {
            ActivityWindow::Trailing { days } => days,
            ActivityWindow::Weeks { weeks } => weeks.saturating_mul(7),
        }
    }

    /// First day of the window ending at `end`.
    pub fn first_day(&self, end: NaiveDate) -> NaiveDate {
        let back = match *self {
            ActivityWindow::Trailing { days } => u64::from(days.saturating_sub(1)),
            ActivityWindow::Weeks { weeks } => {
                u64::from(end.weekday().num_days_from_sunday())
                    + 7 * u64::from(weeks.saturating_sub(1))
            }
        };
        end.checked_sub_days(chrono::Days::new(back))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Every day of the window, oldest first.
    pub fn days(&self, end: NaiveDate) -> Vec<NaiveDate> {
        self.first_day(end)
            .iter_days()
            .take(self.len_days() as usize)
            .collect()
    }
}

/// Discrete shade of a day on the heat-map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    /// Nothing tracked.
    None,
    /// Under 2 hours.
    Low,
    /// 2 to under 4 hours.
    Medium,
    /// 4 to under 6 hours.
    High,
    /// 6 hours or more.
    Max,
}

impl IntensityLevel {
    pub fn from_secs(total_secs: u64) -> Self {
        match total_secs {
            0 => IntensityLevel::None,
            s if s < 2 * HOUR_SECS => IntensityLevel::Low,
            s if s < 4 * HOUR_SECS => IntensityLevel::Medium,
            s if s < 6 * HOUR_SECS => IntensityLevel::High,
            _ => IntensityLevel::Max,
        }
    }

    /// 0 for `None` up to 4 for `Max`.
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Tracked time for one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub total_secs: u64,
    pub level: IntensityLevel,
    /// The day has not happened yet; render it empty rather than as "no activity".
    pub future: bool,
}

/// Sum entry durations per day of `window`, which ends at `window_end`
/// (normally today in `tz`).
pub fn aggregate<Tz: TimeZone>(
    entries: &[TimeEntry],
    window_end: NaiveDate,
    window: ActivityWindow,
    tz: &Tz,
) -> Vec<DayBucket> {
    let totals = totals_by_day(entries, tz);
    window
        .days(window_end)
        .into_iter()
        .map(|date| {
            if date > window_end {
                return DayBucket {
                    date,
                    total_secs: 0,
                    level: IntensityLevel::None,
                    future: true,
                };
            }
            let total_secs = totals.get(&date).copied().unwrap_or(0);
            DayBucket {
                date,
                total_secs,
                level: IntensityLevel::from_secs(total_secs),
                future: false,
            }
        })
        .collect()
}

/// [`aggregate`] in the machine's local time zone, ending today.
pub fn aggregate_local(entries: &[TimeEntry], window: ActivityWindow) -> Vec<DayBucket> {
    aggregate(entries, Local::now().date_naive(), window, &Local)
}

/// Group buckets into columns of seven for grid rendering.
pub fn weeks(buckets: &[DayBucket]) -> Vec<&[DayBucket]> {
    buckets.chunks(7).collect()
}

fn totals_by_day<Tz: TimeZone>(entries: &[TimeEntry], tz: &Tz) -> HashMap<NaiveDate, u64> {
    let mut totals: HashMap<NaiveDate, u64> = HashMap::new();
    for entry in entries {
        let Some(start) = tz.timestamp_millis_opt(entry.start_time).earliest() else {
            tracing::warn!(id = %entry.id, start_time = entry.start_time, "entry start out of range");
            continue;
        };
        let total = totals.entry(start.date_naive()).or_default();
        *total = total.saturating_add(entry.duration);
    }
    totals
}
