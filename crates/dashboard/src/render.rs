//! Plain-text rendering of a [`StreamReport`].

use std::fmt::Write as _;

use crate::report::{DailyCount, StreamReport, ValueCount};

/// Widest bar drawn for the largest count in a chart.
pub const BAR_WIDTH: usize = 40;

const BAR_CHAR: char = '#';

/// Renders the full dashboard: header, statistic cards, then charts.
pub fn render_text(report: &StreamReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Stream Activity: {} ({})", report.stream_name, report.stream_id);
    let _ = writeln!(out, "{}", "─".repeat(60));

    match &report.latest_commit_url {
        Some(url) => {
            let _ = writeln!(out, "Latest commit: {url}");
        }
        None => {
            let _ = writeln!(out, "Latest commit: none");
        }
    }
    out.push('\n');

    out.push_str("Statistics\n");
    card(&mut out, "Number of branches", report.branches.total, &report.branches.names);
    card(&mut out, "Number of commits", report.commit_count as u64, &[]);
    card(
        &mut out,
        "Number of connectors",
        report.connectors.count as u64,
        &report.connectors.names,
    );
    card(
        &mut out,
        "Number of contributors",
        report.contributors.count as u64,
        &report.contributors.names,
    );

    out.push_str("\nGraphs\n");
    chart(&mut out, "Commits per branch", &report.branches.commit_counts);
    chart(&mut out, "Commits per connector", &report.apps);
    chart(&mut out, "Commits per author", &report.authors);

    out.push_str("\nCommit Activity Timeline\n");
    timeline(&mut out, &report.daily_activity);

    out
}

fn card(out: &mut String, label: &str, value: u64, names: &[String]) {
    let _ = writeln!(out, "  {label}: {value}");
    for name in names {
        let _ = writeln!(out, "    - {name}");
    }
}

fn chart(out: &mut String, title: &str, rows: &[ValueCount]) {
    let _ = writeln!(out, "  {title}");
    if rows.is_empty() {
        out.push_str("    (no data)\n");
        return;
    }

    let label_w = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|r| r.count).max().unwrap_or(0);
    for row in rows {
        let _ = writeln!(
            out,
            "    {:<lw$}  {:>5}  {}",
            row.label,
            row.count,
            bar(row.count, max),
            lw = label_w,
        );
    }
}

fn timeline(out: &mut String, days: &[DailyCount]) {
    if days.is_empty() {
        out.push_str("  (no dated commits)\n");
        return;
    }

    let max = days.iter().map(|d| d.count).max().unwrap_or(0);
    for day in days {
        let _ = writeln!(out, "  {}  {:>5}  {}", day.date, day.count, bar(day.count, max));
    }
}

/// A bar proportional to `count / max`, at least one character for any
/// non-zero count.
pub fn bar(count: u64, max: u64) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let scaled = (count as u128 * BAR_WIDTH as u128 / max as u128) as usize;
    BAR_CHAR.to_string().repeat(scaled.clamp(1, BAR_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{BranchSummary, DistinctSummary};
    use chrono::NaiveDate;
    use domain::StreamId;

    fn report() -> StreamReport {
        StreamReport {
            stream_id: StreamId::new("s1").unwrap(),
            stream_name: "Tower".into(),
            branches: BranchSummary {
                total: 2,
                names: vec!["main".into(), "facade".into()],
                commit_counts: vec![
                    ValueCount { label: "main".into(), count: 4 },
                    ValueCount { label: "facade".into(), count: 1 },
                ],
            },
            commit_count: 5,
            connectors: DistinctSummary { count: 1, names: vec!["Rhino".into()] },
            contributors: DistinctSummary { count: 1, names: vec!["Ada".into()] },
            apps: vec![ValueCount { label: "Rhino".into(), count: 5 }],
            authors: vec![ValueCount { label: "Ada".into(), count: 5 }],
            daily_activity: vec![
                DailyCount { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), count: 2 },
                DailyCount { date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), count: 0 },
            ],
            latest_commit_url: Some("https://speckle.example.com/embed?stream=s1&commit=c5".into()),
        }
    }

    #[test]
    fn bars_scale_to_largest_count() {
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(5, 10).len(), BAR_WIDTH / 2);
        assert_eq!(bar(1, 1000).len(), 1);
        assert_eq!(bar(0, 10), "");
    }

    #[test]
    fn text_contains_cards_and_charts() {
        let text = render_text(&report());

        assert!(text.starts_with("Stream Activity: Tower (s1)"));
        assert!(text.contains("Number of branches: 2"));
        assert!(text.contains("    - facade"));
        assert!(text.contains("Number of commits: 5"));
        assert!(
            text.contains("Latest commit: https://speckle.example.com/embed?stream=s1&commit=c5")
        );
        assert!(text.contains("2024-01-02      0  \n"));
    }

    #[test]
    fn empty_charts_say_so() {
        let mut report = report();
        report.apps.clear();
        report.daily_activity.clear();
        report.latest_commit_url = None;

        let text = render_text(&report);

        assert!(text.contains("(no data)"));
        assert!(text.contains("(no dated commits)"));
        assert!(text.contains("Latest commit: none"));
    }
}
