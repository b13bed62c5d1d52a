//! CSV output formatting.

use super::DiscoveryReport;
use std::io::{self, Write};

/// Write a report as `url,status` rows.
pub fn write_csv<W: Write>(out: W, report: &DiscoveryReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["url", "status"])?;
    for result in &report.results {
        wtr.write_record([
            result.url.as_str(),
            &result.status.map_or(String::new(), |s| s.to_string()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
