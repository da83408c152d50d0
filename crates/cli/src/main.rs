//! `stream-activity`: terminal dashboard for one stream on a Speckle server.
//!
//! This binary is the composition root. It:
//!
//! 1. **Loads configuration** from `<config dir>/stream-activity/config.toml`
//!    (or `--config`), then applies flag and environment overrides.
//! 2. **Wires observability**: `tracing-subscriber` on stderr (text or JSON),
//!    plus an OpenTelemetry OTLP exporter when `logging.otlp_endpoint` is set.
//! 3. **Resolves credentials** from `--token`/`SPECKLE_TOKEN`, the config
//!    file, or the local account store.
//! 4. **Builds the client**: [`transport::HttpExecutor`] wrapped by
//!    [`resources::auth::establish`] into an authenticated connection.
//! 5. **Runs the dashboard flow** and prints the report as text or JSON.

mod config;
mod credentials;
mod flow;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use domain::{NoopTracker, UsageTracker};
use resources::{auth, Client, LogTracker};
use transport::{HttpExecutor, HttpOptions};

use config::Config;
use flow::{FlowSettings, Outcome};

#[derive(Parser, Debug)]
#[command(
    name = "stream-activity",
    version,
    about = "Branch, commit and contributor statistics for a Speckle stream"
)]
struct Cli {
    /// Path to config file (default: <config dir>/stream-activity/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Server URL, e.g. macad.speckle.xyz
    #[arg(long, env = "SPECKLE_SERVER", value_name = "URL")]
    server: Option<String>,

    /// Personal access token
    #[arg(long, env = "SPECKLE_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Stream name to report on (default: the first stream listed)
    #[arg(long, value_name = "NAME")]
    stream: Option<String>,

    /// Maximum number of commits to analyse (default from config: 100)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    commit_limit: Option<u32>,

    /// Maximum number of branches to fetch (default from config: 10)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    branch_limit: Option<u32>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    let telemetry = telemetry::init(&config.logging, cli.verbose)?;
    let result = run(cli, config).await;
    if let Err(e) = &result {
        tracing::error!("stream-activity failed: {e:#}");
    }
    telemetry.shutdown();
    result
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let accounts_path = config
        .accounts_file
        .clone()
        .or_else(credentials::default_accounts_path);
    let local = match &accounts_path {
        Some(path) => credentials::load_local_accounts(path)?,
        None => Vec::new(),
    };

    let account = credentials::resolve_account(
        cli.server.as_deref().or(config.server_url.as_deref()),
        cli.token.as_deref().or(config.token.as_deref()),
        local,
    )?;

    let options = HttpOptions {
        timeout: Duration::from_secs(config.request_timeout_secs),
        ..HttpOptions::default()
    };
    let base = Arc::new(
        HttpExecutor::new(&account, &options).context("failed to build the HTTP client")?,
    );

    let tracker: Arc<dyn UsageTracker> = if config.tracking.enabled {
        Arc::new(LogTracker)
    } else {
        Arc::new(NoopTracker)
    };

    let server = account.server_url.clone();
    let connection = auth::establish(base, account, tracker, config.fetch_policy)
        .await
        .with_context(|| format!("failed to authenticate with {server}"))?;
    let client = Client::new(connection);

    let settings = FlowSettings {
        stream_name: cli.stream,
        stream_limit: config.stream_limit,
        branch_limit: cli.branch_limit.unwrap_or(config.branch_limit),
        commit_limit: cli.commit_limit.unwrap_or(config.commit_limit),
    };

    match flow::build_report(&client, &settings).await? {
        Outcome::NoStream => {
            println!("no stream found");
        }
        Outcome::Report(report) if cli.json => {
            println!("{}", dashboard::render_json(&report)?);
        }
        Outcome::Report(report) => {
            print!("{}", dashboard::render_text(&report));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "stream-activity",
            "--server",
            "macad.speckle.xyz",
            "--token",
            "abc",
            "--stream",
            "Hyperbuilding A",
            "--commit-limit",
            "50",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.server.as_deref(), Some("macad.speckle.xyz"));
        assert_eq!(cli.stream.as_deref(), Some("Hyperbuilding A"));
        assert_eq!(cli.commit_limit, Some(50));
        assert!(cli.json);
    }

    #[test]
    fn zero_commit_limit_is_rejected() {
        assert!(Cli::try_parse_from(["stream-activity", "--commit-limit", "0"]).is_err());
    }
}
