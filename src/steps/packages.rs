//! Package-list steps and git-based tools

use std::fs;
use std::io::Write;
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::PathBuf;
use tracing::info;

use super::{StepContext, StepOutcome, install_packages, run_recorded};
use crate::command_runner::CommandInvocation;
use crate::config::GitTool;
use crate::error::{Result, SetupError};
use crate::theme;
use crate::types::Backend;

pub fn install_core_packages(ctx: &StepContext<'_>, out: &mut dyn Write) -> StepOutcome {
    theme::section(out, "Installing core packages...");
    let outcome = install_packages(ctx.runner, Backend::Pkg, &ctx.catalog.core_packages, out);
    theme::done(out, "Core packages installed!");
    outcome
}

pub fn install_python_modules(ctx: &StepContext<'_>, out: &mut dyn Write) -> StepOutcome {
    theme::section(out, "Installing Python modules...");
    let outcome = install_packages(ctx.runner, Backend::Pip, &ctx.catalog.python_modules, out);
    theme::done(out, "Python modules installed!");
    outcome
}

/// Security packages from `pkg`, then every git tool
pub fn install_security_tools(ctx: &StepContext<'_>, out: &mut dyn Write) -> Result<StepOutcome> {
    theme::section(out, "Installing security tools...");
    let mut outcome =
        install_packages(ctx.runner, Backend::Pkg, &ctx.catalog.security_packages, out);

    for tool in &ctx.catalog.git_tools {
        clone_or_update(ctx, tool, &mut outcome, out);
        link_entry_point(ctx, tool, out)?;
    }

    theme::done(out, "Security tools installed!");
    Ok(outcome)
}

/// `git clone --depth 1` when the checkout is missing, `git pull` otherwise
pub fn clone_or_update(
    ctx: &StepContext<'_>,
    tool: &GitTool,
    outcome: &mut StepOutcome,
    out: &mut dyn Write,
) -> bool {
    let dir = ctx.paths.tool_dir(tool);
    let dir_arg = dir.display().to_string();

    let invocation = if dir.exists() {
        theme::info(out, &format!("{} already exists, updating...", tool.name));
        CommandInvocation::new(
            ["git", "-C", dir_arg.as_str(), "pull"],
            format!("Updating {}", tool.name),
        )
    } else {
        theme::progress(out, &format!("Installing {} from git...", tool.name));
        CommandInvocation::new(
            ["git", "clone", "--depth", "1", tool.url.as_str(), dir_arg.as_str()],
            format!("Cloning {}", tool.name),
        )
    };

    run_recorded(ctx, outcome, invocation, out)
}

/// Link the tool's entry point into `~/bin` and make it executable.
///
/// Returns the link path when one was created. An existing link (even a
/// dangling one) is left alone; a missing entry point is skipped with a
/// notice since the clone may have failed.
pub fn link_entry_point(
    ctx: &StepContext<'_>,
    tool: &GitTool,
    out: &mut dyn Write,
) -> Result<Option<PathBuf>> {
    let Some(entry) = &tool.entry_point else {
        return Ok(None);
    };

    let link = ctx.paths.bin.join(&tool.name);
    if fs::symlink_metadata(&link).is_ok() {
        return Ok(None);
    }

    let target = ctx.paths.tool_dir(tool).join(entry);
    if !target.is_file() {
        theme::failure(
            out,
            &format!("{} not found, skipping link for {}", target.display(), tool.name),
        );
        return Ok(None);
    }

    fs::create_dir_all(&ctx.paths.bin).map_err(|e| SetupError::path_io(&ctx.paths.bin, e))?;
    symlink(&target, &link).map_err(|e| SetupError::path_io(&link, e))?;
    fs::set_permissions(&target, fs::Permissions::from_mode(0o755))
        .map_err(|e| SetupError::path_io(&target, e))?;

    info!(link = %link.display(), target = %target.display(), "linked git tool");
    theme::created(out, &format!("Linked {} -> {}", link.display(), target.display()));
    Ok(Some(link))
}
