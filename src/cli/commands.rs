//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page aggregator CLI
#[derive(Parser, Debug)]
#[command(name = "page-aggregator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a page, splitting it across as many upstream requests as needed
    Fetch {
        /// Source definition file (YAML)
        #[arg(short, long, conflicts_with = "url")]
        source: Option<PathBuf>,

        /// Collection endpoint (instead of --source)
        #[arg(long, required_unless_present = "source")]
        url: Option<String>,

        /// Largest page the endpoint serves (overrides the source file)
        #[arg(short, long)]
        external_page_size: Option<u32>,

        /// Cap on concurrent upstream requests (overrides the source file)
        #[arg(long)]
        max_concurrency: Option<usize>,

        /// Extra request header, as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Records per page
        #[arg(long)]
        page_size: u32,
    },

    /// Show the sub-requests needed for a page, given the total record count
    Plan {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Records per page
        #[arg(long)]
        page_size: u32,

        /// Largest page the endpoint serves
        #[arg(short, long)]
        external_page_size: u32,

        /// Total records the source holds
        #[arg(short, long)]
        total_records: u64,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented, human-readable output
    Pretty,
}
