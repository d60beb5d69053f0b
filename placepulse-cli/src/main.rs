//! PlacePulse CLI - interactive place search in the terminal
//!
//! Reads queries from stdin and drives the session engine:
//!
//! - a non-empty line submits a search
//! - an empty line clears the session (like clearing the search box)
//! - `:limit <n>` changes the page-size limit, `:limit` shows it
//! - `:quit` (or end of input) exits

mod frontend;

use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use placepulse::provider::{PlaceSearchProvider, ReqwestSearchClient};
use placepulse::session::{parse_limit, SessionDaemon, DEFAULT_PAGE_LIMIT};

use frontend::{ConsoleNotifier, ConsoleRenderer};

/// Search MusicBrainz places and watch their markers count down.
#[derive(Debug, Parser)]
#[command(name = "placepulse", version, about)]
struct Cli {
    /// Initial page-size limit for search requests (1-100).
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    limit: u32,

    /// Override the search endpoint base URL (mainly for local testing).
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let client = match ReqwestSearchClient::new() {
        Ok(client) => client,
        Err(error) => {
            eprintln!("failed to set up HTTP client: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut provider = PlaceSearchProvider::new(client);
    if let Some(endpoint) = &cli.endpoint {
        provider = provider.with_base_url(endpoint.clone());
    }

    let (daemon, handle) = SessionDaemon::new(provider, ConsoleRenderer::new(), ConsoleNotifier);
    let shutdown = CancellationToken::new();
    let daemon_task = tokio::spawn(daemon.run(shutdown.clone()));

    let mut current_limit = DEFAULT_PAGE_LIMIT;
    if cli.limit != DEFAULT_PAGE_LIMIT {
        if handle.set_limit(cli.limit.to_string()).await.is_err() {
            eprintln!("session ended unexpectedly");
            return ExitCode::FAILURE;
        }
        if parse_limit(&cli.limit.to_string()).is_ok() {
            current_limit = cli.limit;
        }
    }

    println!("type a search, an empty line to clear, :limit <n>, :quit to exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();

        let result = if line.is_empty() {
            handle.clear().await
        } else if let Some(rest) = line.strip_prefix(":limit") {
            let rest = rest.trim();
            if rest.is_empty() {
                println!("current limit: {current_limit}");
                continue;
            }
            if let Ok(limit) = parse_limit(rest) {
                current_limit = limit;
            }
            handle.set_limit(rest).await
        } else if line == ":quit" {
            break;
        } else {
            handle.submit(line).await
        };

        if result.is_err() {
            eprintln!("session ended unexpectedly");
            break;
        }
    }

    debug!("shutting down");
    shutdown.cancel();
    let _ = daemon_task.await;

    ExitCode::SUCCESS
}
