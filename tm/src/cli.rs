//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TripMind - multi-stage trip planning orchestrator
#[derive(Parser)]
#[command(name = "tm", about = "Plan multi-day trips through a staged generation pipeline", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip from a free-text prompt
    Plan {
        /// Natural language trip description
        prompt: String,

        /// Owner of the trip
        #[arg(short, long, default_value = "local")]
        owner: String,

        /// Trip identifier; generated when omitted
        #[arg(short, long)]
        trip: Option<String>,

        /// Transport priority (cheapest, fastest, greenest, balanced)
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Ask a question about or request a change to an existing plan
    FollowUp {
        /// Owner of the trip
        #[arg(short, long, default_value = "local")]
        owner: String,

        /// Trip identifier
        #[arg(short, long)]
        trip: String,

        /// The follow-up utterance
        utterance: String,

        /// Attribute a resulting version to this user instead of the owner
        #[arg(long)]
        modified_by: Option<String>,
    },

    /// List stored versions of a plan
    Versions {
        #[arg(short, long, default_value = "local")]
        owner: String,

        #[arg(short, long)]
        trip: String,
    },

    /// Show a stored plan (latest version by default)
    Show {
        #[arg(short, long, default_value = "local")]
        owner: String,

        #[arg(short, long)]
        trip: String,

        /// Specific version to show
        #[arg(short, long)]
        version: Option<u32>,
    },
}
