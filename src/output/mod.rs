//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of discovery
//! results. Writers take any `io::Write` so reports can be rendered into
//! buffers as well as stdout.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, print_warning, write_plain};

use crate::discovery::ProbeOutcome;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Output format for discovery results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Which discovery produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Subdomains,
    Directories,
}

impl ReportKind {
    fn noun(&self) -> &'static str {
        match self {
            Self::Subdomains => "subdomains",
            Self::Directories => "directories",
        }
    }
}

/// Results of one discovery run, ready for printing.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub kind: ReportKind,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<ProbeOutcome>,
}

impl DiscoveryReport {
    pub fn new(kind: ReportKind, target: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            target: target.into(),
            started_at,
            duration_ms: 0,
            results: Vec::new(),
        }
    }
}

/// Render `report` into `out` in the requested format.
pub fn write_report<W: Write>(out: W, report: &DiscoveryReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report),
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Csv => write_csv(out, report),
    }
}

/// Format and print a report to stdout.
pub fn print_report(report: &DiscoveryReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    write_report(stdout.lock(), report, format)
}
