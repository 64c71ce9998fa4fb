//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// MJML e-mail template development tool
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: envelopr.toml)
    #[arg(short = 'C', long, global = true, default_value = "envelopr.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a config file and the project directories
    #[command(visible_alias = "i")]
    Init {
        /// Project directory (relative to current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dir: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Compile every document once
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Watch templates, rebuild on change and serve a live preview
    #[command(visible_aliases = ["s", "watch"])]
    Serve {
        #[command(flatten)]
        paths: PathArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Path overrides shared by Build and Serve (relative to project root)
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Documents directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub documents: Option<PathBuf>,

    /// Partials directory
    #[arg(short = 'P', long, value_hint = clap::ValueHint::DirPath)]
    pub partials: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,
}
