//! # paas
//!
//! Command-line client of the application platform.
//!
//! Deployments upload a gzip-compressed tar archive built with the [`archiver`] crate.
//! The server streams build and deploy logs back, which are printed as they arrive.
//! An operation is considered successful only if the streamed output ends with an `OK` line.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use clap::Parser;
use commands::{AppCommands, Cli, Commands};
use config::ClientConfig;

/// CLI subcommands.
mod commands;

/// Client configuration (API target, token, logging).
mod config;

/// Container file lookup.
mod container_file;

/// Archive upload and response streaming.
mod upload;

/// CLI entrypoint.
fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    let config_file = cli.config_file.as_deref();

    let config = ClientConfig::new(config_file)?;
    common::logging::init(&config.logging);

    match cli.command {
        Commands::Login(args) => commands::login(args, config_file)?,
        Commands::Archive(args) => commands::archive(args)?,
        Commands::App(AppCommands::Build(args)) => commands::build(args, &config)?,
        Commands::App(AppCommands::Deploy(args)) => commands::deploy(args, &config)?,
    }

    Ok(())
}
