//! CLI argument definitions for the PPR pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ppr-pipeline",
    version,
    about = "Process OLDC PPR extracts into consolidated historical workbooks",
    long_about = "Reshape raw OLDC performance progress report extracts into the\n\
                  consolidated historical workbook: standardized submissions,\n\
                  missing-submission reconciliation, long and wide analytical\n\
                  views, and the coverage metadata sheet."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// Process a state/tribal grantee extract.
    Grantees(GranteeArgs),

    /// Process a coalition extract.
    Coalitions(CoalitionArgs),
}

#[derive(Parser)]
pub struct GranteeArgs {
    /// Directory holding the raw extract's Screen-N.csv sheets.
    #[arg(value_name = "EXTRACT_DIR")]
    pub extract: PathBuf,

    /// Directory holding the crosswalk workbook tabs.
    #[arg(long = "crosswalk", value_name = "DIR")]
    pub crosswalk: PathBuf,

    /// Path of the previously processed artifact (backed up, then replaced).
    #[arg(long = "processed", value_name = "PATH")]
    pub processed: PathBuf,

    /// Schema epoch of the extract.
    #[arg(long = "epoch", value_enum, default_value = "legacy")]
    pub epoch: EpochArg,

    /// Validate and report without writing the output artifact.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CoalitionArgs {
    /// Directory holding the raw extract's Screen-N.csv sheets.
    #[arg(value_name = "EXTRACT_DIR")]
    pub extract: PathBuf,

    /// Directory holding the crosswalk workbook tabs.
    #[arg(long = "crosswalk", value_name = "DIR")]
    pub crosswalk: PathBuf,

    /// CSV mapping states to full coalition names.
    #[arg(long = "names", value_name = "CSV")]
    pub names: PathBuf,

    /// Path of the previously processed artifact (backed up, then replaced).
    #[arg(long = "processed", value_name = "PATH")]
    pub processed: PathBuf,

    /// JSON ground-truth override (defaults to the built-in roster).
    #[arg(long = "ground-truth", value_name = "JSON")]
    pub ground_truth: Option<PathBuf>,

    /// Schema epoch of the extract.
    #[arg(long = "epoch", value_enum, default_value = "legacy")]
    pub epoch: EpochArg,

    /// Validate and report without writing the output artifact.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EpochArg {
    /// Form versions through fiscal year 2023.
    Legacy,
    /// Form version 8, fiscal year 2024 onward.
    Current,
}

impl EpochArg {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
