//! CLI argument definitions using clap
//!
//! - pgchat                   # Interactive mode (default)
//! - pgchat --query "..."     # One question, print the answer, exit

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "pgchat")]
#[command(about = "Chat with a PostgreSQL database through a PG-MCP server")]
#[command(
    long_about = r#"Chat with a PostgreSQL database through a PG-MCP server

USAGE:
  pgchat                          # Start interactive mode
  pgchat --query "your question"  # Answer one question and exit

ENVIRONMENT:
  OPENAI_API_KEY                  # Required
  DATABASE_URL                    # Required, handed to the PG-MCP connect tool
  PG_MCP_URL                      # Defaults to http://localhost:8000/sse
  OPENAI_MODEL                    # Defaults to gpt-4o

Variables may also be placed in a .env file."#
)]
#[command(version)]
pub struct Cli {
    /// Natural language query to answer (omit for the interactive prompt)
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Event-stream URL of the PG-MCP server
    #[arg(long, env = "PG_MCP_URL")]
    pub mcp_url: Option<String>,

    /// Model to use for chat completions
    #[arg(short = 'm', long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
