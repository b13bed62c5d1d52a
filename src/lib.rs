//! # Mira - A Reconnaissance Tool for Web Targets
//!
//! Mira gathers information about a domain: its addresses and WHOIS record,
//! its open TCP ports, the directories its landing page links to, the
//! subdomains that answer over HTTP and the software it runs.
//!
//! ## Features
//!
//! - **Concurrent Discovery**: A worker pool drains a shared work queue of
//!   candidates, each probed independently
//! - **Subdomain Brute Force**: Wordlist-driven `<label>.<host>` probing
//! - **Directory Extraction**: Same-origin directory links from the landing page
//! - **Collaborators Behind Traits**: DNS, WHOIS, port scanning and
//!   fingerprinting can each be swapped out
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use mira::discovery::DiscoveryScanner;
//! use mira::types::Target;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = Target::parse("example.com").unwrap();
//!     let scanner = DiscoveryScanner::for_target(target, Duration::from_secs(5))
//!         .unwrap()
//!         .with_workers(10);
//!
//!     for found in scanner.scan("subdomains.txt").await.unwrap() {
//!         println!("{}", found.url);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated targets and port specifications
//! - [`discovery`] - Work queue, result collector, worker pool and scanner
//! - [`directory`] - Directory link extraction
//! - [`recon`] - DNS, WHOIS, port scan and fingerprinting collaborators
//! - [`config`] - Application settings
//! - [`output`] - Output formatting utilities
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod directory;
pub mod discovery;
pub mod error;
pub mod output;
pub mod recon;
pub mod types;

// Re-export commonly used types
pub use discovery::{Candidate, DiscoveryScanner, Probe, ProbeOutcome, ResultCollector, WorkQueue};
pub use error::{CliError, DiscoveryError, ProbeError, ReconError};
pub use types::{Port, PortSpec, Target};
