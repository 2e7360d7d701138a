use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::Action;

/// Termux Setup Tool - provision Termux with packages, tools and shell config
#[derive(Parser, Debug)]
#[command(name = "termux-setup")]
#[command(about = "Menu-driven setup for development and network tools on Termux")]
#[command(version)]
pub struct Cli {
    /// Print external commands instead of executing them.
    ///
    /// Directories and configuration files are still written.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Package catalog (JSON) replacing the built-in package lists
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Home directory to set up (defaults to $HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Log file (appended to)
    #[arg(long, global = true, default_value = "setup.log")]
    pub log_file: PathBuf,

    /// Run even when not inside Termux
    #[arg(long, global = true)]
    pub skip_host_check: bool,

    /// Show debug logs on stderr (turns the progress spinner off)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,
    /// Run one menu action without the menu
    Run {
        #[arg(value_enum)]
        action: Action,
    },
    /// Validate a package catalog file
    Validate {
        /// Path to the catalog file
        catalog: PathBuf,
    },
    /// Write the built-in package catalog as JSON
    InitConfig {
        /// Where to write the catalog
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
