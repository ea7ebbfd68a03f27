//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "metamodel",
    bin_name = "metamodel",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Inspect and validate facet metamodels",
    long_about = "metamodel builds object specifications from class manifests, \
                  applies layout files and reports what the programming model \
                  derived for each type.",
    after_help = "EXAMPLES:\n\
        \x20 metamodel list\n\
        \x20 metamodel inspect crm.Customer\n\
        \x20 metamodel layout crm.Customer > crm.Customer.layout.json\n\
        \x20 metamodel validate --strict",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the specification of one type.
    #[command(
        visible_alias = "i",
        about = "Show the specification of a type",
        after_help = "EXAMPLES:\n\
            \x20 metamodel inspect crm.Customer\n\
            \x20 metamodel inspect crm.Customer --facets\n\
            \x20 metamodel --output-format json inspect crm.Customer"
    )]
    Inspect(InspectArgs),

    /// List every specification the class source yields.
    #[command(
        visible_alias = "ls",
        about = "List known types",
        after_help = "EXAMPLES:\n\
            \x20 metamodel list\n\
            \x20 metamodel list --format csv"
    )]
    List(ListArgs),

    /// Print the effective layout of a type.
    #[command(
        about = "Print the effective layout of a type",
        after_help = "EXAMPLES:\n\
            \x20 metamodel layout crm.Customer"
    )]
    Layout(LayoutArgs),

    /// Load every type and run the metamodel validators.
    #[command(
        about = "Validate the metamodel",
        after_help = "EXAMPLES:\n\
            \x20 metamodel validate\n\
            \x20 metamodel validate --strict   # warnings fail too"
    )]
    Validate(ValidateArgs),

    /// Initialise a configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 metamodel init           # platform config directory\n\
            \x20 metamodel init --local   # ./metamodel.toml"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 metamodel completions bash > ~/.local/share/bash-completion/completions/metamodel\n\
            \x20 metamodel completions zsh  > ~/.zfunc/_metamodel\n\
            \x20 metamodel completions fish > ~/.config/fish/completions/metamodel.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 metamodel config get sources.classes_dir\n\
            \x20 metamodel config list\n\
            \x20 metamodel config path"
    )]
    Config(ConfigCommands),
}

// ── inspect ───────────────────────────────────────────────────────────────────

/// Arguments for `metamodel inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Fully qualified type name.
    #[arg(value_name = "TYPE", help = "Type to inspect, e.g. crm.Customer")]
    pub type_name: String,

    /// Show every facet of every member, not just a summary.
    #[arg(long = "facets", help = "Show member facets")]
    pub facets: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `metamodel list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── layout ────────────────────────────────────────────────────────────────────

/// Arguments for `metamodel layout`.
#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Fully qualified type name.
    #[arg(value_name = "TYPE", help = "Type whose layout to print")]
    pub type_name: String,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `metamodel validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Treat warnings as failures, overriding `validation.fail_on_warnings`.
    #[arg(long = "strict", help = "Fail on warnings as well as errors")]
    pub strict: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `metamodel init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `metamodel.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `metamodel completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `metamodel config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `persistence.mechanism`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
