//! The dashboard flow: pick a stream, fetch its branches and commits, build
//! the report.

use anyhow::{Context, Result};
use dashboard::StreamReport;
use resources::{select_stream, Client, NestedLimits, SearchOptions};

/// Per-run limits and the requested stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    /// Stream name to search for; the first listed stream when `None`.
    pub stream_name: Option<String>,
    pub stream_limit: u32,
    pub branch_limit: u32,
    pub commit_limit: u32,
}

/// What a run produced.
#[derive(Debug)]
pub enum Outcome {
    Report(Box<StreamReport>),
    /// Nothing matched (or the account has no streams).
    NoStream,
}

/// Commits fetched per branch; only each page's total count is used.
const BRANCH_COMMIT_PAGE: u32 = 10;

/// Lists streams, selects one, and builds its report.
///
/// With a stream name the selection comes from a search and must match the
/// name exactly. Without one the first listed stream is used.
pub async fn build_report(client: &Client, settings: &FlowSettings) -> Result<Outcome> {
    let streams = client
        .stream
        .list(settings.stream_limit)
        .await
        .context("failed to list streams")?;
    tracing::info!(count = streams.len(), "listed streams");

    let chosen = match settings.stream_name.as_deref() {
        Some(name) => {
            let options = SearchOptions {
                nested: NestedLimits {
                    branches: settings.branch_limit,
                    ..NestedLimits::default()
                },
                ..SearchOptions::default()
            };
            let results = client
                .stream
                .search(name, options)
                .await
                .with_context(|| format!("failed to search streams for `{name}`"))?;
            select_stream(results, name)
        }
        None => streams.into_iter().next(),
    };

    let Some(chosen) = chosen else {
        tracing::info!(requested = ?settings.stream_name, "no stream found");
        return Ok(Outcome::NoStream);
    };
    tracing::info!(stream = %chosen.id, name = %chosen.name, "selected stream");

    let limits = NestedLimits {
        branches: settings.branch_limit,
        ..NestedLimits::default()
    };
    let stream = client
        .stream
        .get(&chosen.id, limits)
        .await
        .with_context(|| format!("failed to fetch stream {}", chosen.id))?;

    let branches = client
        .branch
        .list(&stream.id, settings.branch_limit, BRANCH_COMMIT_PAGE)
        .await
        .with_context(|| format!("failed to list branches of {}", stream.id))?;

    let commits = client
        .commit
        .list(&stream.id, settings.commit_limit)
        .await
        .with_context(|| format!("failed to list commits of {}", stream.id))?;

    let server = &client.connection().account().server_url;
    let report = StreamReport::build(&stream, &branches, &commits, server);
    Ok(Outcome::Report(Box::new(report)))
}
