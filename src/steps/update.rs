//! Update step: system packages, pip and git tools

use std::io::Write;

use super::{StepContext, StepOutcome, run_recorded};
use crate::command_runner::CommandInvocation;
use crate::theme;

pub fn update_all(ctx: &StepContext<'_>, out: &mut dyn Write) -> StepOutcome {
    theme::section(out, "Updating everything...");
    let mut outcome = StepOutcome::default();

    let commands = [
        CommandInvocation::new(["pkg", "update", "-y"], "Updating package lists"),
        CommandInvocation::new(["pkg", "upgrade", "-y"], "Upgrading packages"),
        CommandInvocation::new(
            ["pip", "list", "--outdated", "--format=freeze"],
            "Checking outdated pip packages",
        ),
    ];
    for command in commands {
        run_recorded(ctx, &mut outcome, command, out);
    }

    outcome.merge(update_git_tools(ctx, out));

    theme::done(out, "All updates completed!");
    outcome
}

/// `git pull` every git tool that has a checkout; absent tools are skipped
pub fn update_git_tools(ctx: &StepContext<'_>, out: &mut dyn Write) -> StepOutcome {
    theme::progress(out, "Updating git tools...");
    let mut outcome = StepOutcome::default();

    for tool in &ctx.catalog.git_tools {
        let dir = ctx.paths.tool_dir(tool);
        if !dir.exists() {
            continue;
        }
        theme::info(out, &format!("Updating {}...", tool.name));
        let dir_arg = dir.display().to_string();
        run_recorded(
            ctx,
            &mut outcome,
            CommandInvocation::new(
                ["git", "-C", dir_arg.as_str(), "pull"],
                format!("Updating {}", tool.name),
            ),
            out,
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PackageCatalog, SetupPaths};
    use crate::steps::testing::RecordingRunner;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_update_all_skips_missing_git_tools() {
        let home = tempdir().unwrap();
        let paths = SetupPaths::from_home(home.path());
        let catalog = PackageCatalog::default();
        let runner = RecordingRunner::default();
        let ctx = StepContext::new(&paths, &catalog, &runner);
        let mut out = Vec::new();

        let outcome = update_all(&ctx, &mut out);

        assert_eq!(
            runner.commands(),
            vec![
                "pkg update -y",
                "pkg upgrade -y",
                "pip list --outdated --format=freeze"
            ]
        );
        assert_eq!(outcome.succeeded, 3);
    }

    #[test]
    fn test_update_all_pulls_present_git_tools() {
        let home = tempdir().unwrap();
        let paths = SetupPaths::from_home(home.path());
        fs::create_dir_all(paths.tools.join("sqlmap")).unwrap();
        let catalog = PackageCatalog::default();
        let runner = RecordingRunner::failing_on(&["upgrade"]);
        let ctx = StepContext::new(&paths, &catalog, &runner);
        let mut out = Vec::new();

        let outcome = update_all(&ctx, &mut out);

        assert_eq!(runner.calls.borrow().len(), 4);
        assert_eq!(outcome.failed, vec!["Upgrading packages"]);
        assert!(runner.commands()[3].ends_with("sqlmap pull"));
    }
}
