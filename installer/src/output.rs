//! Output formatting for the installer CLI.
//!
//! Progress and diagnostics go through the log facade; this module renders
//! the end-of-run summary and the dry-run plan printed to stderr.

use crate::config::InstallSettings;
use crate::pipeline::{InstallPlan, InstallSummary};
use std::io::Write;

/// Write `message` and a newline to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; nothing useful can be done on failure.
    }
}

/// Format the success message printed after a run.
///
/// # Example
///
/// ```
/// use thirdparty_installer::output::success_message;
/// use thirdparty_installer::pipeline::InstallSummary;
///
/// let summary = InstallSummary { installed: 1, skipped: 3, aggregate: None };
/// assert_eq!(success_message(&summary), "Installed 1 library (3 skipped)");
/// ```
#[must_use]
pub fn success_message(summary: &InstallSummary) -> String {
    let plural = if summary.installed == 1 {
        "library"
    } else {
        "libraries"
    };
    let mut message = format!(
        "Installed {} {plural} ({} skipped)",
        summary.installed, summary.skipped
    );
    if let Some(aggregate) = &summary.aggregate {
        message.push_str(&format!("; aggregate descriptor written to {aggregate}"));
    }
    message
}

/// Dry-run plan together with the settings it was computed from.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Resolved settings.
    pub settings: &'a InstallSettings,
    /// The computed plan.
    pub plan: &'a InstallPlan,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let settings = self.settings;
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Manifest: {}", settings.manifest_path()),
            format!("Repository: {}", settings.repository),
            format!("Group prefix: {}", settings.group_prefix),
            format!("Dependency scope: {}", settings.dependency_scope),
            format!(
                "Aggregate: {} -> {}",
                settings.aggregate.coordinate(),
                settings.aggregate_output
            ),
            format!("Install aggregate: {}", settings.install_aggregate),
            String::new(),
        ];

        if self.plan.entries.is_empty() {
            lines.push("No libraries match the inclusion patterns.".to_owned());
        } else {
            lines.push("Libraries to install:".to_owned());
            for entry in &self.plan.entries {
                let marker = if entry.present { "" } else { " (missing)" };
                lines.push(format!("  - {} from {}{marker}", entry.coordinate, entry.source));
            }
        }
        lines.push(format!("Skipped: {}", self.plan.skipped));

        lines.join("\n")
    }
}
