//! Termux Setup - main entry point

use anyhow::Context;
use std::io::{IsTerminal, stdin, stdout};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

use termux_setup::cli::{Cli, Commands};
use termux_setup::config::{PackageCatalog, SetupPaths};
use termux_setup::host::{self, HostCheck};
use termux_setup::menu::{Menu, MenuExit, MenuOptions};
use termux_setup::{SystemRunner, StepContext, logging, process_guard, run_action};

const INTERRUPT_MESSAGE: &str = "Setup interrupted by user";

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let log_file = cli.log_file.clone();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("Unexpected error: {e:#}");
            eprintln!("\nCritical error occurred: {e:#}");
            eprintln!("Check {}", log_file.display());
            ExitCode::FAILURE
        }
    }
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<PackageCatalog> {
    let catalog = match path {
        Some(path) => {
            info!("Loading package catalog from {:?}", path);
            PackageCatalog::load_from_file(path)?
        }
        None => PackageCatalog::default(),
    };
    catalog.validate().context("Invalid package catalog")?;
    Ok(catalog)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Catalog maintenance needs neither logging nor Termux
    match &cli.command {
        Some(Commands::Validate { catalog }) => {
            return match load_catalog(Some(catalog)) {
                Ok(_) => {
                    println!("✓ Catalog is valid: {}", catalog.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("✗ Catalog validation failed: {e:#}");
                    Ok(ExitCode::FAILURE)
                }
            };
        }
        Some(Commands::InitConfig { output }) => {
            PackageCatalog::default().save_to_file(output)?;
            println!("✓ Wrote built-in catalog to {}", output.display());
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    logging::init(&cli.log_file, cli.verbose)?;
    info!("Termux setup starting up");

    if let Err(e) = process_guard::init_signal_handlers(INTERRUPT_MESSAGE) {
        warn!("Failed to initialize signal handlers: {}", e);
    }
    debug!("Signal handlers initialized");

    let check = HostCheck::run();
    if !check.is_termux {
        if cli.skip_host_check || host::should_skip_host_check() {
            warn!("Not running inside Termux, continuing because the host check is skipped");
        } else {
            error!("Not running inside Termux");
            host::print_not_termux_error();
            return Ok(ExitCode::FAILURE);
        }
    }
    host::warn_if_root(&check);

    let paths = match &cli.home {
        Some(home) => SetupPaths::from_home(home),
        None => SetupPaths::from_env()?,
    };
    let catalog = load_catalog(cli.config.as_deref())?;
    let runner = SystemRunner::new()
        .dry_run(cli.dry_run)
        .with_progress(!cli.verbose);
    let ctx = StepContext::new(&paths, &catalog, &runner);

    match cli.command {
        Some(Commands::Run { action }) => {
            let report = run_action(action, &ctx, &mut stdout());
            let abandoned: Vec<_> = report.abandoned_steps().collect();
            if abandoned.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                error!("Abandoned steps: {:?}", abandoned);
                Ok(ExitCode::FAILURE)
            }
        }
        _ => {
            let options = MenuOptions {
                clear_screen: stdout().is_terminal(),
                ..MenuOptions::default()
            };
            let mut menu = Menu::new(ctx, stdin().lock(), stdout(), options);
            let exit = menu.run()?;
            match exit {
                MenuExit::Quit => info!("Exited from menu"),
                MenuExit::InputClosed => info!("Input closed, leaving menu"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
