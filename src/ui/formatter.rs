//! Pure formatting functions for UI output.
//!
//! Everything goes to stderr; stdout carries the `name=value` outputs.

use console::style;

use crate::boundary::SkipReason;
use crate::cli::RunReport;
use crate::tagging::CheckOutcome;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display why no tag is created.
pub fn display_skip(reason: &SkipReason) {
    eprintln!("{} {}", style("⚠ SKIPPED:").yellow(), reason);
}

/// Display the proposed tag change (or initial tag).
pub fn display_proposed_tag(old_tag: Option<&str>, new_tag: &str) {
    match old_tag {
        Some(old) => {
            eprintln!("\n{}", style("Proposed Tag Change:").bold());
            eprintln!("  From: {}", style(old).red());
            eprintln!("  To:   {}", style(new_tag).green());
        }
        None => {
            eprintln!("\n{}", style("Initial Tag:").bold());
            eprintln!("  New tag: {}", style(new_tag).green());
        }
    }
}

/// Summarize a finished run.
pub fn display_report(report: &RunReport) {
    display_status(&format!("Branch: {}", style(&report.branch).cyan()));

    match &report.outcome {
        CheckOutcome::Skipped(reason) => display_skip(reason),
        CheckOutcome::Candidate(tag) => {
            display_proposed_tag(report.base_tag.as_deref(), tag);
            if report.applied {
                display_success(&format!("Created tag {}", tag));
            } else {
                display_status(&format!("Dry run: tag {} not created", tag));
            }
        }
    }
}
