//! CLI command definitions for the `agenthub` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod agent;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Build, run, and serve AI agents.
#[derive(Parser)]
#[command(name = "agenthub", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed logs (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "AGENTHUB_LOG_JSON")]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "AGENTHUB_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000", env = "AGENTHUB_PORT")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1", env = "AGENTHUB_HOST")]
        host: String,
    },

    /// Run a stored agent for one turn.
    Run {
        /// Agent id.
        agent_id: String,

        /// User message sent to the agent.
        input: String,

        /// Act as this user (defaults to the anonymous identity).
        #[arg(long, env = "AGENTHUB_USER")]
        user: Option<String>,
    },

    /// Show recent runs of an agent.
    Runs {
        /// Agent id.
        agent_id: String,

        /// Maximum number of runs to show (1-100).
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Act as this user (defaults to the anonymous identity).
        #[arg(long, env = "AGENTHUB_USER")]
        user: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
