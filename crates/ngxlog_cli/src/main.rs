//! ngxlog CLI
//!
//! Parse and render access-log lines with an nginx-style `log_format`.
//!
//! # Commands
//!
//! - `parse` - Turn log lines into JSON objects
//! - `render` - Turn JSON objects into log lines
//! - `check` - Compile a template and describe it

mod commands;
mod config;
mod error;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

/// Access-log format tools.
#[derive(Parser)]
#[command(name = "ngxlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template, or `combined` (overrides the config file)
    #[arg(global = true, short, long)]
    format: Option<String>,

    /// JSON configuration file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Longest accepted input line in bytes (overrides the config file)
    #[arg(global = true, long)]
    max_line_len: Option<usize>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse log lines into JSON objects
    Parse {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Skip lines that do not match instead of stopping
        #[arg(short, long)]
        skip_invalid: bool,
    },

    /// Render JSON objects into log lines
    Render {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Skip records that cannot be read instead of stopping
        #[arg(short, long)]
        skip_invalid: bool,
    },

    /// Compile the template and show its variables
    Check {
        /// Print the result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::new(),
    };
    if let Some(format) = cli.format {
        config = config.with_format(format);
    }
    if let Some(len) = cli.max_line_len {
        config = config.with_max_line_len(len);
    }
    debug!(?config, "configuration loaded");

    let format = config.compile()?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Parse {
            input,
            skip_invalid,
        } => {
            let skip_invalid = config.skip_invalid || skip_invalid;
            let config = config.with_skip_invalid(skip_invalid);
            let input = open_input(input.as_deref())?;
            let summary = commands::parse::run(&format, &config, input, &mut stdout)?;
            info!(processed = summary.processed, skipped = summary.skipped, "parse finished");
        }
        Commands::Render {
            input,
            skip_invalid,
        } => {
            let skip_invalid = config.skip_invalid || skip_invalid;
            let config = config.with_skip_invalid(skip_invalid);
            let input = open_input(input.as_deref())?;
            let summary = commands::render::run(&format, &config, input, &mut stdout)?;
            info!(processed = summary.processed, skipped = summary.skipped, "render finished");
        }
        Commands::Check { json } => {
            commands::check::run(&format, json, &mut stdout)?;
        }
    }

    Ok(())
}
