//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "billrecon",
    version,
    about = "Reconcile billing documents against vessel and customer reference data",
    long_about = "Reconcile the fields extracted from billing documents against the vessel \
                  ownership registry and the customer master data.\n\n\
                  Flags documents whose billing counterpart is not the vessel's technical \
                  manager or whose billing address differs from the address on file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Configuration file (TOML). Built-in defaults are used when omitted.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the reference exports (overrides the config file).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile field extractor payload files.
    Reconcile(ReconcileArgs),

    /// Watch the intake directory and reconcile files as they arrive.
    Watch(WatchArgs),

    /// Show which reference datasets are in use.
    Datasets,
}

#[derive(Parser)]
pub struct ReconcileArgs {
    /// Files holding the raw payload returned by the field extractor.
    #[arg(value_name = "PAYLOAD", required = true)]
    pub payloads: Vec<PathBuf>,

    /// Directory for the `<name>.json` results (default: next to each payload).
    #[arg(long = "output-dir", value_name = "DIR", conflicts_with = "stdout")]
    pub output_dir: Option<PathBuf>,

    /// Print results to stdout instead of writing files.
    #[arg(long = "stdout")]
    pub stdout: bool,
}

#[derive(Parser)]
pub struct WatchArgs {
    /// Process the files currently waiting, then exit.
    #[arg(long = "once")]
    pub once: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
