//! Environment steps: Termux bootstrap, system optimization and repairs

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{StepContext, StepOutcome, record_io_failure, run_recorded};
use crate::command_runner::CommandInvocation;
use crate::config::SetupPaths;
use crate::error::{Result, SetupError};
use crate::theme;

pub const PROMPT_MARKER: &str = "# DarkNK Custom Prompt";

pub const PROMPT_BLOCK: &str = r"export PS1='\[\033[1;32m\]DarkNK@\[\033[1;34m\]\h:\[\033[1;35m\]\w\[\033[0m\]\$ '
export LS_OPTIONS='--color=auto'
alias ls='ls $LS_OPTIONS'
alias ll='ls $LS_OPTIONS -l'
alias la='ls $LS_OPTIONS -la'
";

pub const PROPERTIES_MARKER: &str = "# Performance optimizations";

pub const PROPERTIES_BLOCK: &str = "bell-character=ignore
terminal-margin-horizontal=2
terminal-margin-vertical=2
";

/// Result of a marker-guarded append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    AlreadyPresent,
}

/// Append `marker` followed by `body` to `path`, unless a line equal to
/// `marker` is already there. The file is created if missing; existing
/// content is never rewritten.
pub fn append_block(path: &Path, marker: &str, body: &str) -> io::Result<AppendOutcome> {
    match fs::read_to_string(path) {
        Ok(existing) if existing.lines().any(|line| line.trim_end() == marker) => {
            return Ok(AppendOutcome::AlreadyPresent);
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(file, "\n{marker}\n{body}")?;
    Ok(AppendOutcome::Appended)
}

/// Create the tools, scripts and wordlists directories. Returns the ones
/// that did not exist before; calling it again returns an empty list.
pub fn create_directories(paths: &SetupPaths) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in paths.workspace_dirs() {
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(dir).map_err(|e| SetupError::path_io(dir, e))?;
        created.push(dir.to_path_buf());
    }
    Ok(created)
}

/// Append the custom prompt to the shell startup file
pub fn setup_shell_prompt(paths: &SetupPaths, outcome: &mut StepOutcome, out: &mut dyn Write) {
    match append_block(&paths.bashrc, PROMPT_MARKER, PROMPT_BLOCK) {
        Ok(AppendOutcome::Appended) => {
            theme::created(out, "Custom prompt configured");
            outcome.record("shell prompt", true);
        }
        Ok(AppendOutcome::AlreadyPresent) => {
            theme::info(out, "Custom prompt already configured");
            outcome.record("shell prompt", true);
        }
        Err(e) => record_io_failure(outcome, "shell prompt".to_string(), &e, out),
    }
}

/// Initial Termux setup: refresh packages, storage access, directories,
/// shell prompt
pub fn setup_termux(ctx: &StepContext<'_>, out: &mut dyn Write) -> Result<StepOutcome> {
    theme::section(out, "Setting up Termux environment...");
    let mut outcome = StepOutcome::default();

    run_recorded(
        ctx,
        &mut outcome,
        CommandInvocation::new(["pkg", "update", "-y"], "Updating package lists"),
        out,
    );
    run_recorded(
        ctx,
        &mut outcome,
        CommandInvocation::new(["pkg", "upgrade", "-y"], "Upgrading packages"),
        out,
    );

    theme::progress(out, "Setting up storage access...");
    run_recorded(
        ctx,
        &mut outcome,
        CommandInvocation::new(["termux-setup-storage"], "Setting up storage"),
        out,
    );

    for dir in create_directories(ctx.paths)? {
        info!(dir = %dir.display(), "created directory");
        theme::created(out, &format!("Created: {}", dir.display()));
        outcome.record(dir.display().to_string(), true);
    }

    setup_shell_prompt(ctx.paths, &mut outcome, out);

    theme::done(out, "Termux setup completed!");
    Ok(outcome)
}

/// Clean the package cache and tune terminal properties
pub fn optimize_system(ctx: &StepContext<'_>, out: &mut dyn Write) -> StepOutcome {
    theme::section(out, "Optimizing system...");
    let mut outcome = StepOutcome::default();

    run_recorded(
        ctx,
        &mut outcome,
        CommandInvocation::new(["pkg", "clean"], "Cleaning package cache"),
        out,
    );

    let properties = &ctx.paths.termux_properties;
    let result = properties
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| append_block(properties, PROPERTIES_MARKER, PROPERTIES_BLOCK));
    match result {
        Ok(_) => outcome.record("terminal properties", true),
        Err(e) => record_io_failure(&mut outcome, "terminal properties".to_string(), &e, out),
    }

    theme::done(out, "System optimized!");
    outcome
}

/// Regular files (and links) directly inside `dir`, sorted
fn files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files
}

/// Repair common Termux problems
pub fn fix_broken(ctx: &StepContext<'_>, out: &mut dyn Write) -> StepOutcome {
    theme::section(out, "Fixing Termux issues...");
    let mut outcome = StepOutcome::default();

    let fixes = [
        CommandInvocation::new(["pkg", "update", "--fix-missing"], "Fixing broken packages"),
        CommandInvocation::new(["pkg", "install", "-f", "-y"], "Forcing package fixes"),
        CommandInvocation::new(["pip", "check"], "Checking pip installations"),
    ];
    for fix in fixes {
        run_recorded(ctx, &mut outcome, fix, out);
    }

    let bin = &ctx.paths.bin;
    let scripts = files_in(bin);
    if scripts.is_empty() {
        theme::info(out, "No scripts in ~/bin, skipping shebang fix");
    } else {
        let argv = std::iter::once("termux-fix-shebang".to_string())
            .chain(scripts.iter().map(|p| p.display().to_string()));
        run_recorded(
            ctx,
            &mut outcome,
            CommandInvocation::new(argv, "Fixing shebangs"),
            out,
        );
    }

    if bin.is_dir() {
        run_recorded(
            ctx,
            &mut outcome,
            CommandInvocation::new(
                ["chmod".to_string(), "-R".to_string(), "+x".to_string(), bin.display().to_string()],
                "Fixing permissions",
            ),
            out,
        );
    }

    theme::done(out, "Fixes applied!");
    outcome
}
