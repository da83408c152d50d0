//! Stream activity report.
//!
//! Turns one stream plus its fetched branches and commits into a
//! [`StreamReport`] (statistic cards, per-branch/connector/author counts, and
//! a gap-filled daily commit series), then renders it as plain text or JSON.
//!
//! ## Architectural Layer
//!
//! **Business logic.** Pure functions over `domain` models; no I/O and no
//! server access. The `cli` crate fetches the data and prints the output.

mod render;
mod report;

pub use render::{bar, render_text, BAR_WIDTH};
pub use report::{
    daily_activity, distinct_in_order, value_counts, BranchSummary, DailyCount, DistinctSummary,
    StreamReport, ValueCount, UNKNOWN_LABEL,
};

/// Renders `report` as pretty-printed JSON.
pub fn render_json(report: &StreamReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
