//! Envelopr - build, watch and live-preview MJML e-mail templates.

mod build;
mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod source;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Init { dir, force } => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            let root = dir.as_ref().map_or_else(|| cwd.clone(), |dir| cwd.join(dir));
            cli::init::init_project(&root, &cli.config, *force).map(|_| ())
        }
        Commands::Build { .. } => {
            let config = Arc::new(ProjectConfig::load(&cli)?);
            cli::build::build_project(config).map(|_| ())
        }
        Commands::Serve { .. } => {
            let config = Arc::new(ProjectConfig::load(&cli)?);
            cli::serve::serve_project(config)
        }
    }
}
