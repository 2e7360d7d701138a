//! Action orchestration
//!
//! Runs the steps behind a menu action in order. Each step is isolated: an
//! `Err` from one step is logged and reported, and the next step still runs.
//! A full setup additionally prints and saves the summary.

use crossterm::style::Stylize;
use std::io::Write;
use tracing::{error, info, warn};

use crate::steps::{self, StepContext, StepOutcome};
use crate::summary;
use crate::theme::{self, Colors};
use crate::types::{Action, Step};

/// Result of one step inside an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    /// The step's outcome, or the error that abandoned it
    pub result: Result<StepOutcome, String>,
}

/// Result of a whole action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub action: Action,
    pub steps: Vec<StepReport>,
}

impl ActionReport {
    /// True when every step completed and no item failed
    pub fn is_clean(&self) -> bool {
        self.steps
            .iter()
            .all(|s| s.result.as_ref().is_ok_and(StepOutcome::is_clean))
    }

    /// Sum of all completed step outcomes
    pub fn total(&self) -> StepOutcome {
        let mut total = StepOutcome::default();
        for outcome in self.steps.iter().filter_map(|s| s.result.as_ref().ok()) {
            total.merge(outcome.clone());
        }
        total
    }

    pub fn abandoned_steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.steps.iter().filter(|s| s.result.is_err()).map(|s| s.step)
    }
}

/// Run every step of `action`, then the summary if the action asks for one
pub fn run_action(action: Action, ctx: &StepContext<'_>, out: &mut dyn Write) -> ActionReport {
    info!(%action, "starting action");
    let composite = action.writes_summary();

    if composite {
        let bar = theme::rule('=', 45);
        let _ = writeln!(out, "\n{}", bar.as_str().with(Colors::HEADING));
        let _ = writeln!(out, "{}", "      STARTING FULL SETUP".with(Colors::PRIMARY));
        let _ = writeln!(out, "{}", bar.as_str().with(Colors::HEADING));
    }

    let mut report = ActionReport {
        action,
        steps: Vec::with_capacity(action.steps().len()),
    };

    for &step in action.steps() {
        if composite {
            let _ = writeln!(out, "\n{}", format!("▶ {step}").with(Colors::ACCENT));
        }

        let result = steps::run_step(step, ctx, out).map_err(|e| e.report());
        match &result {
            Ok(outcome) => {
                info!(%step, succeeded = outcome.succeeded, failed = outcome.failed.len(), "step finished");
                if composite {
                    let _ = writeln!(out, "{}", format!("✓ {step} completed").with(Colors::SUCCESS));
                }
            }
            Err(e) => {
                error!("Step {step} failed: {e}");
                let _ = writeln!(out, "{}", format!("✗ {step} failed: {e}").with(Colors::ERROR));
            }
        }

        report.steps.push(StepReport { step, result });
    }

    if composite {
        let text = summary::render_summary(ctx.paths, ctx.catalog, &report);
        let _ = writeln!(out, "\n{text}");
        if let Err(e) = summary::write_summary(ctx.paths, &text) {
            let reason = e.report();
            warn!(error = %reason, "could not save summary");
            theme::failure(out, &format!("Could not save summary: {reason}"));
        }
    }

    let total = report.total();
    info!(
        %action,
        succeeded = total.succeeded,
        failed = total.failed.len(),
        "action finished"
    );
    report
}
