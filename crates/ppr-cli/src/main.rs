//! OLDC PPR pipeline CLI.

use clap::{ColorChoice, Parser};
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod logging;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_coalitions, run_grantees};
use crate::logging::{LogConfig, LogFormat, init_logging};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match cli.command {
        Command::Grantees(args) => run_grantees(&args),
        Command::Coalitions(args) => run_coalitions(&args),
    };
    let exit_code = match result {
        Ok(result) => {
            print_summary(&result);
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: level_filter(&cli.verbosity),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && std::io::stderr().is_terminal(),
    };
    config
}

fn level_filter(
    verbosity: &clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,
) -> LevelFilter {
    verbosity.tracing_level_filter()
}
