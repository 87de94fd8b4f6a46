use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flvsync")]
#[command(author, version, about = "Live FLV rewriter that injects wall-clock synchronization")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for rewriting when no subcommand is given
    #[command(flatten)]
    pub rewrite: RewriteArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite an FLV stream (the default when no subcommand is given)
    Rewrite(RewriteArgs),

    /// List the tags of an FLV file
    Inspect {
        /// File to inspect
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RewriteArgs {
    /// Input file (defaults to stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Accepted for compatibility; timing trailers are always written
    #[arg(long)]
    pub write_timestamps: bool,

    /// Stream name announced in the rewritten metadata
    #[arg(long)]
    pub stream_name: Option<String>,

    /// Drift in milliseconds that triggers a clock-sync tag
    #[arg(long)]
    pub drift_threshold_ms: Option<u32>,

    /// Milliseconds between bandwidth-budget tags
    #[arg(long)]
    pub budget_interval_ms: Option<u64>,
}
