//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Character library build pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Characters directory path (relative to project root)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub characters: Option<PathBuf>,

    /// Config file path (default: charlib.toml)
    #[arg(short = 'C', long, default_value = "charlib.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands (default: build)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the character library into the output directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Regenerate manifest.json from the characters tree
    #[command(visible_alias = "m")]
    Manifest {
        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// List discovered characters and their assets
    #[command(visible_alias = "s")]
    Scan,
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolved command, `build` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Build {
            build_args: BuildArgs::default(),
        })
    }

    pub fn is_verbose(&self) -> bool {
        match self.command() {
            Commands::Build { build_args } => build_args.verbose,
            Commands::Manifest { verbose } => verbose,
            Commands::Scan => false,
        }
    }
}
