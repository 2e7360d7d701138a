//! Post-setup summary
//!
//! Rendered as plain text so the same string can be printed and saved.

use std::fmt::Write as _;
use std::fs;

use crate::config::{PackageCatalog, SetupPaths};
use crate::error::{Result, SetupError};
use crate::installer::ActionReport;
use crate::theme::rule;

pub fn render_summary(paths: &SetupPaths, catalog: &PackageCatalog, report: &ActionReport) -> String {
    let mut s = String::new();
    let bar = rule('=', 45);

    let headline = if report.is_clean() {
        "SETUP COMPLETED SUCCESSFULLY!"
    } else {
        "SETUP COMPLETED WITH ERRORS"
    };

    let _ = writeln!(s, "{bar}");
    let _ = writeln!(s, "         {headline}");
    let _ = writeln!(s, "{bar}");

    let _ = writeln!(s, "\n📁 Directories Created:");
    for dir in paths.workspace_dirs() {
        let _ = writeln!(s, "  • {}", dir.display());
    }

    let _ = writeln!(s, "\n🔧 Tools Installed:");
    let _ = writeln!(s, "  • {}", catalog.core_packages.join(", "));
    if !catalog.security_packages.is_empty() {
        let _ = writeln!(s, "  • {}", catalog.security_packages.join(", "));
    }
    for tool in &catalog.git_tools {
        let _ = writeln!(s, "  • {} (cloned to tools/)", tool.name);
    }

    let _ = writeln!(s, "\n🐍 Python Modules:");
    for chunk in catalog.python_modules.chunks(4) {
        let _ = writeln!(s, "  • {}", chunk.join(", "));
    }

    let _ = writeln!(s, "\n📊 Results:");
    for step in &report.steps {
        match &step.result {
            Ok(outcome) if outcome.is_clean() => {
                let _ = writeln!(s, "  ✓ {}: {} ok", step.step, outcome.succeeded);
            }
            Ok(outcome) => {
                let _ = writeln!(
                    s,
                    "  ! {}: {} ok, failed: {}",
                    step.step,
                    outcome.succeeded,
                    outcome.failed.join(", ")
                );
            }
            Err(e) => {
                let _ = writeln!(s, "  ✗ {}: {e}", step.step);
            }
        }
    }

    let _ = writeln!(s, "\n🚀 Quick Start Commands:");
    for tool in &catalog.git_tools {
        let _ = writeln!(s, "  • {:<9} : Start {}", tool.name, tool.name);
    }
    let _ = writeln!(s, "  • {:<9} : Network scanner", "nmap");
    let _ = writeln!(s, "  • {:<9} : Python interpreter", "python3");

    let _ = writeln!(s, "\n💡 Next Steps:");
    let _ = writeln!(s, "  1. Restart Termux session");
    let _ = writeln!(s, "  2. Start hacking in ~/tools/");
    let _ = writeln!(s, "  3. Check ~/storage for external storage");

    let _ = writeln!(s, "\n⚠  Remember: Use tools responsibly and legally!");
    s
}

/// Overwrite the summary file
pub fn write_summary(paths: &SetupPaths, summary: &str) -> Result<()> {
    fs::write(&paths.summary_file, summary).map_err(|e| SetupError::path_io(&paths.summary_file, e))
}
