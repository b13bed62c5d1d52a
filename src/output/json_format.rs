//! JSON output formatting.

use super::DiscoveryReport;
use std::io::{self, Write};

/// Write a report as pretty-printed JSON.
pub fn write_json<W: Write>(mut out: W, report: &DiscoveryReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, report).map_err(io::Error::other)?;
    writeln!(out)
}
