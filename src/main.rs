//! charlib - build pipeline for an SVG character library.

mod asset;
mod bundle;
mod cli;
mod config;
mod core;
mod css;
mod logger;
mod manifest;
mod metadata;
mod svg;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::LibraryConfig;
use core::BuildMode;

fn main() {
    if let Err(e) = run() {
        log!("error"; "{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.is_verbose());

    let config = LibraryConfig::load(&cli)?;

    match cli.command() {
        Commands::Build { .. } => {
            cli::build::build_library(&config, BuildMode::from_env()).map(drop)
        }
        Commands::Manifest { .. } => cli::manifest::regenerate_manifest(&config).map(drop),
        Commands::Scan => cli::scan::scan_library(&config).map(drop),
    }
}
