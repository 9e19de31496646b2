//! Command-line entry point for generating OpenAPI documents from annotated
//! Rust handlers.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations generate -i src/handlers -o openapi.json
//! ```
//!
//! Write YAML with an explicit title and version:
//! ```bash
//! openapi-from-annotations generate -i src -f yaml -t "User API" -v 2.0.0
//! ```
//!
//! Load settings from a config file and fail on validation issues:
//! ```bash
//! openapi-from-annotations generate -c openapi.yaml --strict --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli::{self, Cli, Commands};

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize logger based on verbose flag
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-from-annotations starting...");

    match args.command {
        Commands::Generate(generate_args) => cli::run(&generate_args)?,
    }

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
