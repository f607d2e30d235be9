//! CLI module for Quill.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Quill - research, summarize, and draft an email
///
/// Runs a tool-using research agent over Wikipedia, web search and arXiv,
/// summarizes the findings, and wraps the summary in a formal email.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server (POST /run)
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the research, summary and email pipeline locally
    Run {
        /// The research query
        query: String,
    },

    /// Send a query to a running server and show the results
    Ask {
        /// The research query
        query: String,

        /// Base URL of the server (overrides client.api_url)
        #[arg(long, env = "QUILL_API_URL")]
        api_url: Option<String>,
    },

    /// Ask the calculator/weather assistant (e.g. "28*92" or "Hyderabad weather")
    Assist {
        /// Input for the assistant
        input: String,
    },

    /// Check credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a value by dotted key, e.g. `quill config set llm.model gemini-2.0-flash`
    Set {
        /// Dotted key such as `server.port`
        key: String,

        /// New value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
