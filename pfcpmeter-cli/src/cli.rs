//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// pfcpmeter -- turn PFCP captures into labeled time-window datasets.
///
/// Use `pfcpmeter <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "pfcpmeter", version, about, long_about = None)]
pub struct Cli {
    /// Path to the pfcpmeter.toml configuration file.
    #[arg(short, long, default_value = "pfcpmeter.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a capture file, or every capture in a directory, into datasets.
    Convert(ConvertArgs),

    /// List the message categories that make up the dataset columns.
    Taxonomy,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- convert ----

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Capture file or directory of captures.
    pub input: PathBuf,

    /// Directory the datasets are written to (overrides `output.directory`).
    pub output_dir: Option<PathBuf>,

    /// Window length in seconds (overrides `window.interval`).
    #[arg(short, long)]
    pub interval: Option<f64>,

    /// Attach this label to every window instead of running the heuristic labeler.
    #[arg(short, long)]
    pub label: Option<String>,

    /// Window boundary closure: left `[a, b)` or right `(a, b]`.
    #[arg(long)]
    pub closure: Option<String>,

    /// Keep the decoded intermediate CSV next to each dataset.
    #[arg(long)]
    pub keep_intermediate: bool,

    /// Capture extensions picked up in directory mode (overrides `capture.extensions`).
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Treat inputs as already-decoded field CSVs instead of running tshark.
    #[arg(long)]
    pub decoded: bool,

    /// Number of captures processed concurrently (overrides `batch.workers`).
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Path to the tshark binary (overrides `capture.tshark_path`).
    #[arg(long)]
    pub tshark: Option<String>,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file.
    Validate,

    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only this section (general, window, label, capture, output, batch).
        #[arg(long)]
        section: Option<String>,
    },
}
