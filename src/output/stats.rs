//! Human-readable run summary
//!
//! Printed to stdout once a dump finishes.

use crate::crawler::RunSummary;

/// Prints the run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The finished run to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Dump Summary ===\n");
    print!("{}", format_summary(summary));
}

/// Formats the run summary as plain text
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("Overview:\n");
    out.push_str(&format!(
        "  Releases ingested: {}\n",
        summary.report.releases_in_dump
    ));
    out.push_str(&format!(
        "  Already complete: {}\n",
        summary.already_complete
    ));
    out.push_str(&format!("  Failed: {}\n", summary.failures.len()));
    out.push_str(&format!(
        "  Catalogs touched: {}\n",
        summary.report.available_catalogs.len()
    ));

    if !summary.report.available_catalogs.is_empty() {
        out.push_str("\nCatalogs:\n");
        for tag in &summary.report.available_catalogs {
            out.push_str(&format!("  - {}\n", tag));
        }
    }

    if !summary.failures.is_empty() {
        out.push_str(&format!("\nFailed Releases ({}):\n", summary.failures.len()));
        for failure in &summary.failures {
            out.push_str(&format!(
                "  - {}: {}\n",
                failure.identifier, failure.message
            ));
        }
        out.push_str("\nFailed releases stay pending and are retried on the next run.\n");
    }

    out
}
