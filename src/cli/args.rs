//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Split phase values down recipient trees and aggregate per-recipient totals
#[derive(Parser, Debug)]
#[command(name = "splittree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Data directory with project files and local config (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show pre-allocations and the allocation tree of each phase
    Calc {
        /// Project file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Only this phase (id or name)
        #[arg(short, long)]
        phase: Option<String>,
        /// Also show children of collapsed nodes
        #[arg(short, long)]
        expand: bool,
    },

    /// Show the rest value of each phase after pre-allocations
    Rest {
        /// Project file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Aggregate recipient totals across projects
    Stats {
        /// Project files or directories (default: data dir)
        #[arg(value_hint = ValueHint::AnyPath)]
        paths: Vec<PathBuf>,
        /// List where each total comes from
        #[arg(short, long)]
        sources: bool,
        /// Print JSON instead of a table
        #[arg(long, conflicts_with = "sources")]
        json: bool,
    },

    /// Validate a project and list error/warning nodes
    Check {
        /// Project file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Only this phase (id or name)
        #[arg(short, long)]
        phase: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
