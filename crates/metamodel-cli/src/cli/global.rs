//! Flags shared by every `metamodel` subcommand.
//!
//! Flattened into [`super::Cli`]; all of them are `global`, so they may be
//! given before or after the subcommand name.

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log level for the metamodel build. Ignored when `RUST_LOG` is set.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Log more of the metamodel build (-v, -vv, -vvv)",
        long_help = "Log more of the metamodel build:
    (none)  - Warnings (skipped manifests, bad layouts) and errors
    -v      - One line per specification built and per command
    -vv     - Every facet install decision and layout derivation
    -vvv    - Trace level, including instrumented spans"
    )]
    pub verbose: u8,

    /// Status messages are dropped. Requested data (specifications, layouts,
    /// config values) and errors are still printed.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Log errors only"
    )]
    pub quiet: bool,

    /// Honours `NO_COLOR` (<https://no-color.org>) and `output.no_color`.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Print findings and tables without colour"
    )]
    pub no_color: bool,

    /// Replaces the platform config file. `METAMODEL_*` variables still
    /// override it.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Read settings from FILE instead of the platform config"
    )]
    pub config: Option<PathBuf>,

    /// `auto` defers to `output.format` from the configuration.
    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "How specifications, layouts and findings are printed"
    )]
    pub output_format: OutputFormat,

    /// Written through a non-blocking appender; parent directories are
    /// created.
    #[arg(
        long = "log-file",
        global = true,
        value_name = "FILE",
        env = "METAMODEL_LOG_FILE",
        help = "Also write build logs to FILE"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(long = "log-json", global = true, help = "Log as JSON lines")]
    pub log_json: bool,
}

/// Rendering of command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Use `output.format` from the configuration.
    #[default]
    Auto,
    /// Coloured headers, findings and tables.
    Human,
    /// The human layout without ANSI codes.
    Plain,
    /// Serialized DTOs, one document per command.
    Json,
}
