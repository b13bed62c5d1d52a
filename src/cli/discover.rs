//! Discovery modes: directory extraction and subdomain brute force.

use super::Cli;
use crate::config::AppSettings;
use crate::directory::DirectoryExtractor;
use crate::discovery::{DiscoveryScanner, ProbeOutcome};
use crate::error::CliResult;
use crate::output::{self, DiscoveryReport, ReportKind};
use crate::types::Target;
use chrono::Utc;
use std::time::Instant;

/// List same-origin directories linked from the target's landing page.
pub async fn dir_scan(target: &Target, cli: &Cli, settings: &AppSettings) -> CliResult<()> {
    let mut report = DiscoveryReport::new(ReportKind::Directories, target.host(), Utc::now());
    let start = Instant::now();

    let extractor = DirectoryExtractor::new(settings.fetch_timeout())?;
    report.results = extractor
        .discover_directories(target.url())
        .await
        .into_iter()
        .map(ProbeOutcome::new)
        .collect();
    report.duration_ms = start.elapsed().as_millis() as u64;

    output::print_report(&report, cli.format)?;
    Ok(())
}

/// Probe `<label>.<host>` for every label in the wordlist.
pub async fn sub_scan(target: &Target, cli: &Cli, settings: &AppSettings) -> CliResult<()> {
    let wordlist = cli
        .wordlist
        .clone()
        .unwrap_or_else(|| settings.default_wordlist.clone());

    let mut scanner = DiscoveryScanner::for_target(target.clone(), settings.probe_timeout())?
        .with_workers(settings.workers);
    if cli.verbose && !cli.quiet {
        scanner = scanner.with_progress();
    }

    let mut report = DiscoveryReport::new(ReportKind::Subdomains, target.host(), Utc::now());
    let start = Instant::now();
    report.results = scanner.scan(&wordlist).await?;
    report.duration_ms = start.elapsed().as_millis() as u64;

    output::print_report(&report, cli.format)?;
    Ok(())
}
