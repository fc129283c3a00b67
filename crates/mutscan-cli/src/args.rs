use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "mutscan",
    version,
    about = "Mutation-number inventory and format health checks for scanned records"
)]
pub struct Args {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recover mutation numbers from metadata sidecars
    Inventory {
        /// Image files to inventory, in report order
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory that folder names are reported relative to
        #[arg(long)]
        root: Option<PathBuf>,

        /// Suffix appended to an image path to find its metadata dump
        #[arg(long, default_value = ".json")]
        sidecar_suffix: String,

        /// Metadata with fewer top-level tags is treated as stripped
        #[arg(long, default_value_t = 2)]
        min_tags: usize,

        /// Capacity of the worker's event channel
        #[arg(long, default_value_t = 64)]
        channel_capacity: usize,

        #[arg(long, default_value = "json")]
        format: InventoryFormat,

        /// Write output to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check file content against declared formats
    Diagnose {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write repaired copies of fixable files here
        #[arg(long)]
        repair_dir: Option<PathBuf>,

        /// Number of leading bytes searched for a signature
        #[arg(long, default_value_t = 4096)]
        window: usize,

        #[arg(long, default_value = "json")]
        format: OutputFormat,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Condense numbers into range notation
    Ranges {
        #[arg(required = true, allow_negative_numbers = true)]
        numbers: Vec<i64>,

        /// Print the missing numbers instead
        #[arg(long)]
        gaps: bool,
    },

    /// Expand range notation into one number per line
    Expand { text: String },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum InventoryFormat {
    Json,
    Text,
    /// One worker message per line, as emitted
    Ndjson,
}
