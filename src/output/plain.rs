//! Plain text output formatting.
//!
//! Produces the human-readable listing plus the colored status helpers used
//! throughout the CLI.

use super::DiscoveryReport;
use console::style;
use std::io::{self, Write};

/// Write a report as a header line followed by one URL per line.
pub fn write_plain<W: Write>(mut out: W, report: &DiscoveryReport) -> io::Result<()> {
    let noun = report.kind.noun();

    if report.results.is_empty() {
        writeln!(out, "No {} found.", noun)?;
        return Ok(());
    }

    writeln!(out, "{}{} found:", noun[..1].to_uppercase(), &noun[1..])?;
    for result in &report.results {
        writeln!(out, "{}", result.url)?;
    }
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
