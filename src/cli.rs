use clap::{Parser, Subcommand};
use sast_dispatch::output::OutputFormat;
use sast_dispatch::registry::{Language, Mode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sast-dispatch",
    version,
    about = "Dispatch static-analysis scans and normalize their findings"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a workspace with the engine registered for a language and mode
    Scan {
        /// Path to the workspace
        workspace: PathBuf,

        /// Source language
        #[arg(long, short, value_enum)]
        language: Language,

        /// Scanning depth
        #[arg(long, short, default_value = "lite", value_enum)]
        mode: Mode,

        /// Request id echoed into the result
        #[arg(long)]
        id: String,

        /// Output format
        #[arg(long, short, default_value = "json", value_enum)]
        format: OutputFormat,

        /// Write output to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the engine's raw output to stderr
        #[arg(long)]
        show_output: bool,

        /// Custom config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Scan every workspace directory inside a directory, in parallel
    #[command(name = "scan-all")]
    ScanAll {
        /// Directory whose immediate subdirectories are workspaces
        path: PathBuf,

        /// Source language
        #[arg(long, short, value_enum)]
        language: Language,

        /// Scanning depth
        #[arg(long, short, default_value = "lite", value_enum)]
        mode: Mode,

        /// Output format
        #[arg(long, short, default_value = "json", value_enum)]
        format: OutputFormat,

        /// Custom config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Normalize SARIF files into the canonical result schema
    Normalize {
        /// SARIF files, or directories searched recursively for *.sarif
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Request id echoed into the result
        #[arg(long, default_value = "")]
        id: String,

        /// Provenance tag for the result
        #[arg(long, default_value = "sarif")]
        prefix: String,

        /// Output format
        #[arg(long, short, default_value = "json", value_enum)]
        format: OutputFormat,
    },

    /// List registered scanners and whether their tools are available
    CheckTools {
        /// Custom config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
