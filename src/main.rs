mod cli;
mod cli_utils;
mod commands;
mod config;
mod config_discovery;
mod fixer;
mod graph;
mod logging;
mod project;
mod report;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize structured logging
    logging::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Crawl(args) => commands::crawl::run(args),
        Commands::Fix(args) => commands::fix::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Config(args) => commands::config::run(args.command),
        Commands::Doctor(args) => commands::doctor::run(args),
    }
}
