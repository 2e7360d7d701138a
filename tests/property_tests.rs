//! Property-Based Tests
//!
//! Uses proptest for the best-effort invariants:
//! - the runner is invoked once per package, in order, whatever fails
//! - the outcome accounts for every package exactly once
//! - the success flag tracks the exit status of a real process

use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::HashSet;

use termux_setup::{
    Backend, CommandInvocation, CommandRunner, ExecutionResult, SystemRunner, install_packages,
};

/// Fails the packages whose index is in `failing`
struct MaskRunner {
    seen: RefCell<Vec<String>>,
    failing: HashSet<usize>,
}

impl CommandRunner for MaskRunner {
    fn run(&self, invocation: &CommandInvocation) -> ExecutionResult {
        let index = self.seen.borrow().len();
        self.seen
            .borrow_mut()
            .push(invocation.argv.last().cloned().unwrap_or_default());
        if self.failing.contains(&index) {
            ExecutionResult::failed(Some(1), "failed")
        } else {
            ExecutionResult::succeeded()
        }
    }
}

fn backend_strategy() -> impl Strategy<Value = Backend> {
    prop_oneof![Just(Backend::Pkg), Just(Backend::Pip)]
}

fn packages_and_mask() -> impl Strategy<Value = (Vec<String>, Vec<bool>)> {
    prop::collection::vec("[a-z][a-z0-9-]{0,12}", 0..24).prop_flat_map(|packages| {
        let len = packages.len();
        (Just(packages), prop::collection::vec(any::<bool>(), len))
    })
}

proptest! {
    /// One invocation per package, in list order, regardless of failures
    #[test]
    fn runner_called_once_per_package(
        backend in backend_strategy(),
        (packages, mask) in packages_and_mask(),
    ) {
        let failing: HashSet<usize> =
            mask.iter().enumerate().filter(|(_, f)| **f).map(|(i, _)| i).collect();
        let runner = MaskRunner { seen: RefCell::new(Vec::new()), failing };
        let mut out = Vec::new();

        install_packages(&runner, backend, &packages, &mut out);

        prop_assert_eq!(runner.seen.borrow().clone(), packages);
    }

    /// succeeded + failed covers the list; failed holds exactly the masked items
    #[test]
    fn outcome_accounts_for_every_package(
        (packages, mask) in packages_and_mask(),
    ) {
        let failing: HashSet<usize> =
            mask.iter().enumerate().filter(|(_, f)| **f).map(|(i, _)| i).collect();
        let expected_failed: Vec<String> = packages
            .iter()
            .enumerate()
            .filter(|(i, _)| failing.contains(i))
            .map(|(_, p)| p.clone())
            .collect();
        let runner = MaskRunner { seen: RefCell::new(Vec::new()), failing };
        let mut out = Vec::new();

        let outcome = install_packages(&runner, Backend::Pkg, &packages, &mut out);

        prop_assert_eq!(outcome.attempted(), packages.len());
        prop_assert_eq!(outcome.succeeded, packages.len() - expected_failed.len());
        prop_assert_eq!(outcome.failed, expected_failed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The flag is true exactly when the child exits with status zero
    #[test]
    fn success_flag_matches_exit_status(code in 0i32..=255) {
        let runner = SystemRunner::new().with_progress(false);
        let script = format!("exit {code}");
        let result = runner.run(&CommandInvocation::new(["sh", "-c", script.as_str()], "exit"));

        prop_assert_eq!(result.success, code == 0);
        prop_assert_eq!(result.exit_code, Some(code));
    }
}
