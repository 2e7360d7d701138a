//! Termux Setup Library
//!
//! Installs packages, git tools and shell configuration into a Termux home
//! directory. Control flows one way: menu → action → step → command runner →
//! external process.

pub mod cli;
pub mod command_runner;
pub mod config;
pub mod error;
pub mod host;
pub mod installer;
pub mod logging;
pub mod menu;
pub mod process_guard;
pub mod spinner;
pub mod steps;
pub mod summary;
pub mod theme;
pub mod types;

pub use command_runner::{CommandInvocation, CommandRunner, ExecutionResult, SystemRunner};
pub use config::{GitTool, PackageCatalog, SetupPaths};
pub use error::SetupError;
pub use host::{HostCheck, HostEnvironment};
pub use installer::{ActionReport, StepReport, run_action};
pub use menu::{Menu, MenuExit, MenuOptions, MenuState};
pub use process_guard::{ProcessGroupExt, RunningCommands};
pub use steps::{StepContext, StepOutcome, install_packages, run_step};
pub use types::{Action, Backend, MenuChoice, Step};
