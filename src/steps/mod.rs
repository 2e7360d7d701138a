//! Installation steps
//!
//! Every step is a plain function of a [`StepContext`] (path set, catalog,
//! runner) and a console writer. Steps follow a best-effort policy: a failed
//! command is noted, logged and recorded in the [`StepOutcome`], and the step
//! moves on to its next item. Only a filesystem problem that leaves nothing
//! sensible to do next abandons a step with an `Err`.

pub mod environment;
pub mod packages;
pub mod update;

use std::io::Write;
use tracing::warn;

use crate::command_runner::{CommandInvocation, CommandRunner};
use crate::config::{PackageCatalog, SetupPaths};
use crate::error::Result;
use crate::theme;
use crate::types::{Backend, Step};

/// Everything a step needs, passed explicitly
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub paths: &'a SetupPaths,
    pub catalog: &'a PackageCatalog,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> StepContext<'a> {
    pub fn new(
        paths: &'a SetupPaths,
        catalog: &'a PackageCatalog,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            paths,
            catalog,
            runner,
        }
    }
}

/// What a step managed to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Number of items that succeeded
    pub succeeded: usize,
    /// Items that failed, in the order they were attempted
    pub failed: Vec<String>,
}

impl StepOutcome {
    pub fn record(&mut self, item: impl Into<String>, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed.push(item.into());
        }
    }

    pub fn merge(&mut self, other: StepOutcome) {
        self.succeeded += other.succeeded;
        self.failed.extend(other.failed);
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    /// True when nothing failed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Install `packages` one by one through `backend`.
///
/// The runner is invoked exactly once per package, in order. A failure
/// prints a notice and the loop continues; the function itself cannot fail.
pub fn install_packages(
    runner: &dyn CommandRunner,
    backend: Backend,
    packages: &[String],
    out: &mut dyn Write,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    if packages.is_empty() {
        return outcome;
    }

    theme::info(out, &format!("Installing {} packages via {backend}...", packages.len()));

    for package in packages {
        theme::progress(out, &format!("Installing: {package}"));

        let invocation =
            CommandInvocation::new(backend.install_argv(package), format!("Installing {package}"));
        let result = runner.run(&invocation);

        if !result.success {
            theme::failure(out, &format!("Failed to install: {package}"));
        }
        outcome.record(package.as_str(), result.success);
    }

    outcome
}

/// Run a single non-package command and record it under its description
pub(crate) fn run_recorded(
    ctx: &StepContext<'_>,
    outcome: &mut StepOutcome,
    invocation: CommandInvocation,
    out: &mut dyn Write,
) -> bool {
    let ok = ctx.runner.run(&invocation).success;
    if !ok {
        theme::failure(out, &format!("{} failed", invocation.description));
    }
    outcome.record(invocation.description, ok);
    ok
}

/// Record a filesystem action that failed without abandoning the step
pub(crate) fn record_io_failure(
    outcome: &mut StepOutcome,
    item: String,
    error: &std::io::Error,
    out: &mut dyn Write,
) {
    warn!(%item, %error, "filesystem action failed");
    theme::failure(out, &format!("{item}: {error}"));
    outcome.record(item, false);
}

/// Dispatch a step by name
pub fn run_step(step: Step, ctx: &StepContext<'_>, out: &mut dyn Write) -> Result<StepOutcome> {
    match step {
        Step::TermuxSetup => environment::setup_termux(ctx, out),
        Step::CorePackages => Ok(packages::install_core_packages(ctx, out)),
        Step::SecurityTools => packages::install_security_tools(ctx, out),
        Step::PythonModules => Ok(packages::install_python_modules(ctx, out)),
        Step::SystemOptimization => Ok(environment::optimize_system(ctx, out)),
        Step::UpdateAll => Ok(update::update_all(ctx, out)),
        Step::FixBroken => Ok(environment::fix_broken(ctx, out)),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingRunner;
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_all_packages_succeed() {
        let runner = RecordingRunner::default();
        let mut out = Vec::new();

        let outcome = install_packages(&runner, Backend::Pkg, &names(&["curl", "wget"]), &mut out);

        assert_eq!(runner.calls.borrow().len(), 2);
        assert_eq!(outcome.succeeded, 2);
        assert!(outcome.is_clean());
        assert_eq!(
            runner.commands(),
            vec!["pkg install -y curl", "pkg install -y wget"]
        );
    }

    #[test]
    fn test_failure_does_not_stop_remaining_packages() {
        let runner = RecordingRunner::failing_on(&["bad-pkg"]);
        let mut out = Vec::new();

        let outcome = install_packages(
            &runner,
            Backend::Pkg,
            &names(&["curl", "bad-pkg", "wget"]),
            &mut out,
        );

        assert_eq!(runner.calls.borrow().len(), 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, vec!["bad-pkg"]);

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("Failed to install").count(), 1);
        assert!(printed.contains("Failed to install: bad-pkg"));
    }

    #[test]
    fn test_empty_list_is_noop() {
        let runner = RecordingRunner::default();
        let mut out = Vec::new();

        let outcome = install_packages(&runner, Backend::Pip, &[], &mut out);

        assert!(runner.calls.borrow().is_empty());
        assert_eq!(outcome, StepOutcome::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_pip_backend_upgrades() {
        let runner = RecordingRunner::default();
        let mut out = Vec::new();

        install_packages(&runner, Backend::Pip, &names(&["rich"]), &mut out);

        assert_eq!(runner.commands(), vec!["pip install --upgrade rich"]);
    }

    #[test]
    fn test_outcome_merge() {
        let mut a = StepOutcome::default();
        a.record("curl", true);
        let mut b = StepOutcome::default();
        b.record("bad", false);
        b.record("wget", true);

        a.merge(b);
        assert_eq!(a.succeeded, 2);
        assert_eq!(a.failed, vec!["bad"]);
        assert_eq!(a.attempted(), 3);
    }
}
