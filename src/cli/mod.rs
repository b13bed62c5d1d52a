//! CLI definitions and mode dispatch.
//!
//! Exactly one mode runs per invocation:
//! - `mira -t <target> -b` - DNS and WHOIS information
//! - `mira -t <target> -P` - TCP port scan
//! - `mira -t <target> -d` - directory discovery from the landing page
//! - `mira -t <target> -s` - subdomain brute force
//! - `mira -t <target> -T` - web technology fingerprinting

mod discover;
mod recon;

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output::OutputFormat;
use crate::types::Target;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::debug;

/// Mira - A reconnaissance tool for web targets.
///
/// Mira resolves and profiles a domain, scans its TCP ports, discovers
/// directories linked from its landing page, brute-forces subdomains from a
/// wordlist and fingerprints the software it runs.
#[derive(Parser, Debug)]
#[command(name = "mira")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast reconnaissance tool for web targets", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["basic_info", "port_scan", "dir_scan", "sub_scan", "tech_scan"]),
))]
pub struct Cli {
    /// Target domain or URL (e.g. example.com, https://example.com)
    #[arg(short, long, value_name = "TARGET")]
    pub target: String,

    /// Show IP address and WHOIS information
    #[arg(short, long)]
    pub basic_info: bool,

    /// Scan the target's TCP ports
    #[arg(short = 'P', long)]
    pub port_scan: bool,

    /// Ports to scan (e.g., "80", "80,443", "1-1000", "22,80,443,8000-9000")
    #[arg(short, long, value_name = "SPEC")]
    pub ports: Option<String>,

    /// Discover directories linked from the landing page
    #[arg(short, long)]
    pub dir_scan: bool,

    /// Brute-force subdomains from a wordlist
    #[arg(short, long)]
    pub sub_scan: bool,

    /// Wordlist of subdomain labels, one per line
    #[arg(short, long, value_name = "PATH")]
    pub wordlist: Option<PathBuf>,

    /// Fingerprint web technologies
    #[arg(short = 'T', long)]
    pub tech_scan: bool,

    /// Number of concurrent probe workers
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Output format for discovery results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// The mode selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    BasicInfo,
    PortScan,
    DirScan,
    SubScan,
    TechScan,
}

impl Cli {
    /// The selected mode. clap guarantees exactly one flag is set.
    pub fn mode(&self) -> Mode {
        if self.basic_info {
            Mode::BasicInfo
        } else if self.port_scan {
            Mode::PortScan
        } else if self.dir_scan {
            Mode::DirScan
        } else if self.sub_scan {
            Mode::SubScan
        } else {
            Mode::TechScan
        }
    }

    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, settings: &mut AppSettings) {
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        if let Some(ms) = self.timeout {
            settings.probe_timeout_ms = ms;
            settings.fetch_timeout_ms = ms;
        }
    }
}

/// Parse the target and run the selected mode.
pub async fn run(cli: &Cli, settings: &AppSettings) -> CliResult<()> {
    let target = Target::parse(&cli.target)?;
    let mode = cli.mode();
    debug!(?mode, %target, "running mode");

    match mode {
        Mode::BasicInfo => recon::basic_info(&target, settings).await,
        Mode::PortScan => recon::port_scan(&target, cli.ports.as_deref(), settings).await,
        Mode::DirScan => discover::dir_scan(&target, cli, settings).await,
        Mode::SubScan => discover::sub_scan(&target, cli, settings).await,
        Mode::TechScan => recon::tech_scan(&target, settings).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mode_selection() {
        let cli = Cli::try_parse_from(["mira", "-t", "example.com", "-s", "-w", "words.txt"]).unwrap();
        assert_eq!(cli.mode(), Mode::SubScan);
        assert_eq!(cli.wordlist, Some(PathBuf::from("words.txt")));

        let cli = Cli::try_parse_from(["mira", "--target", "example.com", "-T"]).unwrap();
        assert_eq!(cli.mode(), Mode::TechScan);

        let cli = Cli::try_parse_from(["mira", "-t", "example.com", "-P", "--ports", "22,80"]).unwrap();
        assert_eq!(cli.mode(), Mode::PortScan);
        assert_eq!(cli.ports.as_deref(), Some("22,80"));
    }

    #[test]
    fn test_short_p_is_the_port_list() {
        let cli = Cli::try_parse_from(["mira", "-t", "example.com", "-P", "-p", "22,443"]).unwrap();
        assert_eq!(cli.mode(), Mode::PortScan);
        assert_eq!(cli.ports.as_deref(), Some("22,443"));

        // A port list alone selects no mode
        assert!(Cli::try_parse_from(["mira", "-t", "example.com", "-p", "22"]).is_err());
    }

    #[test]
    fn test_wordlist_accepted_with_dir_scan() {
        let cli = Cli::try_parse_from(["mira", "-t", "example.com", "-d", "-w", "words.txt"]).unwrap();
        assert_eq!(cli.mode(), Mode::DirScan);
        assert_eq!(cli.wordlist, Some(PathBuf::from("words.txt")));
    }

    #[test]
    fn test_exactly_one_mode_required() {
        assert!(Cli::try_parse_from(["mira", "-t", "example.com"]).is_err());
        assert!(Cli::try_parse_from(["mira", "-t", "example.com", "-b", "-d"]).is_err());
        assert!(Cli::try_parse_from(["mira", "-b"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "mira", "-t", "example.com", "-d", "--workers", "4", "--timeout", "750",
        ])
        .unwrap();
        let mut settings = AppSettings::default();
        cli.apply_overrides(&mut settings);

        assert_eq!(settings.workers, 4);
        assert_eq!(settings.probe_timeout_ms, 750);
        assert_eq!(settings.fetch_timeout_ms, 750);
        assert_eq!(settings.port_timeout_ms, 3000);
    }

    #[tokio::test]
    async fn test_invalid_target_aborts() {
        let cli = Cli::try_parse_from(["mira", "-t", "not a domain", "-d"]).unwrap();
        let result = run(&cli, &AppSettings::default()).await;
        assert!(matches!(result, Err(crate::error::CliError::Target(_))));
    }
}
