//! Aggregation of one stream's branches and commits into a [`StreamReport`].

use chrono::NaiveDate;
use domain::{Branch, Commit, ServerUrl, Stream, StreamId};
use serde::{Deserialize, Serialize};

/// Label used for commits that carry no source application or author name.
pub const UNKNOWN_LABEL: &str = "unknown";

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// A label with the number of commits it occurs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub label: String,
    pub count: u64,
}

/// Commits created on one calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Distinct values in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistinctSummary {
    pub count: usize,
    pub names: Vec<String>,
}

impl DistinctSummary {
    fn from_names(names: Vec<String>) -> Self {
        Self {
            count: names.len(),
            names,
        }
    }
}

/// Branch card and branch chart data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BranchSummary {
    /// Number of branches on the server, which can exceed the fetched page.
    pub total: u64,
    pub names: Vec<String>,
    /// Server-reported commit total per fetched branch, in branch order.
    pub commit_counts: Vec<ValueCount>,
}

/// Everything the dashboard shows for one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamReport {
    pub stream_id: StreamId,
    pub stream_name: String,
    pub branches: BranchSummary,
    /// Number of fetched commits.
    pub commit_count: usize,
    pub connectors: DistinctSummary,
    pub contributors: DistinctSummary,
    /// Commits per source application, most frequent first.
    pub apps: Vec<ValueCount>,
    /// Commits per author name, most frequent first.
    pub authors: Vec<ValueCount>,
    /// One entry per day from the earliest to the latest commit date.
    pub daily_activity: Vec<DailyCount>,
    /// Viewer URL for the first commit in server order (the newest).
    pub latest_commit_url: Option<String>,
}

impl StreamReport {
    /// Builds the report from already-fetched data. Performs no I/O.
    ///
    /// `commits` are expected in server order (newest first). The branch
    /// total comes from the stream's branch page when present, else from the
    /// number of fetched branches.
    pub fn build(
        stream: &Stream,
        branches: &[Branch],
        commits: &[Commit],
        server: &ServerUrl,
    ) -> Self {
        let total = stream
            .branches
            .as_ref()
            .map_or(branches.len() as u64, |page| page.total_count);

        let branch_summary = BranchSummary {
            total,
            names: branches.iter().map(|b| b.name.clone()).collect(),
            commit_counts: branches
                .iter()
                .map(|b| ValueCount {
                    label: b.name.clone(),
                    count: b.commit_count(),
                })
                .collect(),
        };

        let apps: Vec<String> = commits
            .iter()
            .map(|c| label_or_unknown(&c.source_application))
            .collect();
        let authors: Vec<String> = commits
            .iter()
            .map(|c| label_or_unknown(&c.author_name))
            .collect();
        let collaborators = stream.collaborators.iter().map(|c| c.name.clone());

        let latest_commit_url = commits.first().map(|c| server.embed_url(&stream.id, &c.id));

        let report = Self {
            stream_id: stream.id.clone(),
            stream_name: stream.name.clone(),
            branches: branch_summary,
            commit_count: commits.len(),
            connectors: DistinctSummary::from_names(distinct_in_order(apps.iter().cloned())),
            contributors: DistinctSummary::from_names(distinct_in_order(collaborators)),
            apps: value_counts(apps),
            authors: value_counts(authors),
            daily_activity: daily_activity(
                commits.iter().filter_map(|c| c.created_at).map(|t| t.date()),
            ),
            latest_commit_url,
        };

        tracing::debug!(
            stream = %report.stream_id,
            commits = report.commit_count,
            days = report.daily_activity.len(),
            "stream report built"
        );
        report
    }
}

fn label_or_unknown(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Aggregation helpers
// ---------------------------------------------------------------------------

/// Unique values, keeping the position of each value's first occurrence.
pub fn distinct_in_order<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Occurrence count per value, highest count first. Ties keep first-seen order.
pub fn value_counts<I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<ValueCount> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|c| c.label == value) {
            Some(entry) => entry.count += 1,
            None => counts.push(ValueCount {
                label: value,
                count: 1,
            }),
        }
    }
    // Stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Commits per day over the closed range `[min date, max date]`.
///
/// Every date in the range appears exactly once, in ascending order; days
/// without commits have a count of zero. No dates yields an empty series.
pub fn daily_activity<I>(dates: I) -> Vec<DailyCount>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
    dates.sort_unstable();

    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut day = first;
    let mut remaining = dates.as_slice();
    loop {
        let same_day = remaining.iter().take_while(|d| **d == day).count();
        remaining = &remaining[same_day..];
        series.push(DailyCount {
            date: day,
            count: same_day as u64,
        });

        if day >= last {
            break;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    series
}
