//! pgchat command-line application
//!
//! Answers natural-language questions about a PostgreSQL database by letting
//! an OpenAI model call the tools of a PG-MCP server.
//!
//! ```bash
//! pgchat --query "How many records are in users?"
//! pgchat            # interactive prompt, `exit` to quit
//! ```

mod args;
mod console;

use anyhow::{Context, Result};
use clap::Parser;
use pgchat_core::{BridgeConfig, OpenAiProvider, Orchestrator, Session};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config =
        pgchat_core::load_from_env().context("Failed to load configuration from environment")?;
    if let Some(mcp_url) = cli.mcp_url {
        config.mcp_url = mcp_url;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    let mut orchestrator = connect(&config).await?;

    let outcome = match cli.query {
        Some(query) => run_once(&mut orchestrator, &query).await,
        None => run_interactive(&mut orchestrator, &config).await,
    };

    if let Err(e) = orchestrator.session_mut().close().await {
        warn!("Failed to close session cleanly: {}", e);
    }

    outcome
}

/// Logs go to stderr so answers on stdout stay clean. `--verbose` forces
/// debug output, otherwise `RUST_LOG` applies with `info` as the fallback.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &BridgeConfig) -> Result<Orchestrator> {
    let provider =
        Arc::new(OpenAiProvider::from_config(config).context("Failed to create OpenAI provider")?);

    let mut session = Session::open(config)
        .await
        .with_context(|| format!("Failed to initialize MCP session at {}", config.mcp_url))?;

    if let Err(e) = session.connect_database(&config.database_url).await {
        if let Err(close_err) = session.close().await {
            warn!("Failed to close session: {}", close_err);
        }
        return Err(e).context("Failed to connect to database");
    }

    Ok(Orchestrator::new(session, provider).with_exchange_timeout(config.exchange_timeout()))
}

async fn run_once(orchestrator: &mut Orchestrator, query: &str) -> Result<()> {
    tokio::select! {
        answer = orchestrator.chat(query) => {
            println!("{}", answer);
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            console::print_notice("Interrupted");
            Ok(())
        }
    }
}

async fn run_interactive(orchestrator: &mut Orchestrator, config: &BridgeConfig) -> Result<()> {
    console::print_banner(&config.mcp_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        console::print_prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else {
            println!();
            break;
        };

        if console::is_exit_command(&line) {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        tokio::select! {
            answer = orchestrator.chat(query) => {
                if answer.starts_with("Error: ") {
                    console::print_error(&answer);
                } else {
                    console::print_answer(&answer);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                console::print_notice("Interrupted; the session is still open.");
            }
        }
    }

    info!("Leaving interactive mode");
    Ok(())
}
