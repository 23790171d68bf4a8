//! CBT aggregate CLI
//!
//! Builds aggregate package directories from a spec string and writes the
//! resulting paths as MSBuild properties.

mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use config::Settings;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Aggregate(args) => commands::run_aggregate(&settings, &args),
        Commands::Parse { spec, json } => commands::run_parse(&spec, json),
        Commands::PackageProps(args) => commands::run_package_props(&settings, &args),
    }
}
