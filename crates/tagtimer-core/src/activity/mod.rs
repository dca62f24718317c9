//! Read-side views over the entry collection: the activity heat-map and the
//! history list helpers.

mod heatmap;
mod history;

pub use heatmap::{aggregate, aggregate_local, weeks, ActivityWindow, DayBucket, IntensityLevel};
pub use history::{format_duration, sorted_newest_first, HistorySummary};
