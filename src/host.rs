//! Pre-flight checks for the host environment
//!
//! The tool only makes sense inside Termux. Detection is split into a pure
//! function over the observed environment so it can be tested anywhere.

use std::path::Path;
use tracing::{debug, warn};

use crate::config::TERMUX_PREFIX_SUFFIX;

/// Directory present on every Termux install
pub const TERMUX_BIN_DIR: &str = "/data/data/com.termux/files/usr/bin";

/// Environment variable that skips the Termux check (for development)
pub const SKIP_HOST_CHECK_ENV: &str = "TERMUX_SETUP_SKIP_HOST_CHECK";

/// What the host looks like
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnvironment {
    pub prefix: Option<String>,
    pub home: Option<String>,
    pub termux_bin_exists: bool,
}

impl HostEnvironment {
    /// Observe the current process environment
    pub fn detect() -> Self {
        Self {
            prefix: std::env::var("PREFIX").ok(),
            home: std::env::var("HOME").ok(),
            termux_bin_exists: Path::new(TERMUX_BIN_DIR).exists(),
        }
    }

    pub fn is_termux(&self) -> bool {
        self.termux_bin_exists
            || self
                .prefix
                .as_deref()
                .is_some_and(|p| p.trim_end_matches('/').ends_with(TERMUX_PREFIX_SUFFIX))
            || self.home.as_deref().is_some_and(|h| h.contains("com.termux"))
    }
}

/// Result of the pre-flight checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCheck {
    pub is_termux: bool,
    pub is_root: bool,
}

impl HostCheck {
    pub fn run() -> Self {
        let env = HostEnvironment::detect();
        debug!(?env, "host environment");
        Self {
            is_termux: env.is_termux(),
            is_root: nix::unistd::geteuid().is_root(),
        }
    }
}

/// Whether the Termux check should be skipped via the environment
pub fn should_skip_host_check() -> bool {
    std::env::var(SKIP_HOST_CHECK_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Print the "run me inside Termux" banner
pub fn print_not_termux_error() {
    use crossterm::style::Stylize;

    let bar = crate::theme::rule('=', 50);
    eprintln!("\n{}", bar.as_str().red());
    eprintln!("{}", "ERROR: This tool must be run inside Termux!".red());
    eprintln!("{}", "Please install Termux from Google Play/F-Droid".yellow());
    eprintln!("{}", bar.as_str().red());
}

/// Warn when running as root; informative only
pub fn warn_if_root(check: &HostCheck) {
    use crossterm::style::Stylize;

    if check.is_root {
        warn!("running as root");
        eprintln!("{}", "Warning: Running as root!".red());
        std::thread::sleep(std::time::Duration::from_secs(2));
    }
}
