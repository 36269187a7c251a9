// src/lib.rs

//! Layered experiment configuration.
//!
//! A config file may inherit from parent files through `__default__`, is
//! merged under a new-key policy, can be overridden with typed
//! `--dotted.key value` pairs, and finally has its `$ENV` and `{key}`
//! templates resolved.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod env;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod resolve;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{
    ConfigFormat, ConfigNode, Loader, RunSection, apply_overrides, parse_override_args, strip_run,
};
use crate::diagnostics::Diagnostics;
use crate::env::ProcessEnv;
use crate::fs::{FileSystem, RealFileSystem};
use crate::resolve::Resolver;

/// Load `path` (following `__default__`) and apply `--key value` overrides.
///
/// Templates are left untouched; see [`Resolver`].
pub fn build_config<S: AsRef<str>>(
    fs: &dyn FileSystem,
    path: &Path,
    override_args: &[S],
    diagnostics: &mut Diagnostics,
) -> errors::Result<ConfigNode> {
    let cfg = Loader::new(fs).load_with(path, diagnostics)?;
    let overrides = parse_override_args(override_args)?;
    apply_overrides(&cfg, &overrides)
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and inheritance
/// - command-line overrides
/// - template resolution against the process environment
/// - rendering to stdout or to `--output`
pub fn run(args: CliArgs) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let cfg = build_config(&RealFileSystem, &args.config, &args.overrides, &mut diagnostics)
        .with_context(|| format!("building config from {:?}", args.config))?;

    let cfg = if args.raw {
        cfg
    } else {
        let env = ProcessEnv;
        let mut resolver = Resolver::new(&cfg, &env)?;
        let resolved = resolver
            .resolve()
            .with_context(|| format!("resolving templates in {:?}", args.config))?;
        diagnostics.extend(resolver.into_diagnostics());
        resolved
    };

    if args.dry_run {
        let run = RunSection::from_config(&cfg)?;
        print_dry_run(&run, &diagnostics);
        return Ok(());
    }

    let cfg = if args.strip_run { strip_run(&cfg) } else { cfg };

    let format = match args.format {
        Some(format) => format,
        None => ConfigFormat::from_path(args.output.as_deref().unwrap_or(args.config.as_path()))?,
    };
    let text = format.render(&cfg)?;

    match &args.output {
        Some(path) => {
            RealFileSystem.write(path, text.as_bytes())?;
            info!(output = ?path, "config written");
        }
        None => print!("{text}"),
    }

    if !diagnostics.is_empty() {
        info!(warnings = diagnostics.len(), "config built with warnings");
    }
    Ok(())
}

/// Simple dry-run output: what a launcher would run, and where.
fn print_dry_run(run: &RunSection, diagnostics: &Diagnostics) {
    println!("expconf dry-run");
    println!("  main: {}", run.main);
    println!("  name: {}", run.name);
    println!("  output_dir: {}", run.output_dir.display());
    if let Some(code) = &run.code_dir {
        println!("  code: {}", code.display());
    }

    if !diagnostics.is_empty() {
        println!();
        println!("warnings ({}):", diagnostics.len());
        for warning in diagnostics.warnings() {
            println!("  - {warning}");
        }
    }

    debug!("dry-run complete (nothing written)");
}
