//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Scenario used when none is given on the command line.
pub const DEFAULT_SCENARIO: &str =
    "A young courier must deliver a sealed letter across a flooded city before dawn";

/// Storyboard - narrative-consistent storyboard generation
#[derive(Parser, Debug)]
#[command(name = "storyboard")]
#[command(about = "Generate narrative-consistent storyboards", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show phase, tension, camera angle and scene type per frame, without
    /// calling any service
    Plan {
        /// Number of frames
        #[arg(long, default_value = "6")]
        frames: u32,

        /// Story scenario
        #[arg(long, default_value = DEFAULT_SCENARIO)]
        scenario: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Generate a storyboard with the offline collaborators
    Run {
        /// Number of frames
        #[arg(long, default_value = "6")]
        frames: u32,

        /// Story scenario
        #[arg(long, default_value = DEFAULT_SCENARIO)]
        scenario: String,

        /// Directory to save the storyboard in
        #[arg(long)]
        save: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print a saved storyboard
    Show {
        /// Run id of the storyboard
        #[arg(long)]
        run: String,

        /// Directory the storyboard was saved in
        #[arg(long)]
        dir: PathBuf,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Render seeded variants of one image prompt
    Variants {
        /// Image prompt
        #[arg(long)]
        prompt: String,

        /// Number of variants
        #[arg(long, default_value = "4")]
        count: usize,

        /// Seed of the first variant
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Image model (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,

        /// Renders in flight (defaults to the configured pool size)
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
