//! Error types for Mira.
//!
//! Uses `thiserror` for ergonomic error definitions. Each layer has its own
//! enum; `CliError` is the union the binary prints at the top level.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single network probe.
///
/// These are expected and frequent during brute-force discovery, so workers
/// log them at trace level and drop the candidate.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("invalid probe URL: {0}")]
    InvalidUrl(String),
}

/// Misuse of the work queue's bookkeeping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("mark_done called more times than items were enqueued")]
    TooManyDone,
}

/// Errors raised by the discovery scanner before or around the worker pool.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("wordlist not found or unreadable: {path}")]
    WordlistNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Failures of the external collaborators (DNS, WHOIS, port scan,
/// fingerprinting). Caught at the boundary of each CLI mode.
#[derive(Error, Debug)]
pub enum ReconError {
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// Displayed without a prefix, the report line names the lookup.
    #[error("{0}")]
    Whois(String),

    #[error("port scan failed: {0}")]
    PortScan(String),

    #[error("fingerprinting failed: {0}")]
    Fingerprint(String),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("command '{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors loading application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Top-level error for CLI modes.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Recon(#[from] ReconError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Result type alias for collaborator operations.
pub type ReconResult<T> = Result<T, ReconError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
