// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigFormat;

/// Command-line arguments for `expconf`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "expconf",
    version,
    about = "Load, merge and resolve layered experiment configurations.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML or YAML).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print the merged config without resolving `$ENV` / `{key}` templates.
    #[arg(long)]
    pub raw: bool,

    /// Output format. Defaults to the format of the output (or input) file.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<ConfigFormat>,

    /// Write the result to this file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Drop the `__run__` section from the output.
    #[arg(long)]
    pub strip_run: bool,

    /// Print the `__run__` section and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `EXPCONF_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Overrides of existing keys: `--my.entire.key value ...`.
    ///
    /// Values are converted to the type found in the config; lists take
    /// comma-separated values (`--data.splits 0.8,0.2`). Options of this
    /// command must come before the first override.
    #[arg(
        value_name = "OVERRIDES",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub overrides: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
