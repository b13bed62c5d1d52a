//! Application settings and paths.
//!
//! Settings live in a JSON file under the XDG config directory. Every field
//! has a default, so a partial file (or no file at all) is fine.

use crate::error::{ConfigError, ConfigResult};
use crate::recon::whois::IANA_WHOIS;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/mira)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories. Nothing is created on disk.
    pub fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "mira", "mira").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Probe workers for subdomain discovery.
    pub workers: usize,
    /// Per-probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// Timeout for page fetches (directory and tech scans).
    pub fetch_timeout_ms: u64,
    /// Per-port connect timeout in milliseconds.
    pub port_timeout_ms: u64,
    /// Maximum simultaneous connection attempts during a port scan.
    pub port_concurrency: usize,
    /// Wordlist used when `--wordlist` is not given.
    pub default_wordlist: PathBuf,
    /// Port range used when `--ports` is not given.
    pub default_ports: String,
    /// Program invoked for external fingerprinting.
    pub whatweb_program: String,
    /// Root WHOIS server.
    pub whois_server: String,
    /// WHOIS query timeout in milliseconds.
    pub whois_timeout_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            workers: 10,
            probe_timeout_ms: 5000,
            fetch_timeout_ms: 5000,
            port_timeout_ms: 3000,
            port_concurrency: 500,
            default_wordlist: PathBuf::from("subdomains.txt"),
            default_ports: "1-1000".to_string(),
            whatweb_program: "whatweb".to_string(),
            whois_server: IANA_WHOIS.to_string(),
            whois_timeout_ms: 10_000,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when there is no config directory or no settings file.
    pub fn load() -> ConfigResult<Self> {
        Self::load_with(Paths::new())
    }

    fn load_with(paths: ConfigResult<Paths>) -> ConfigResult<Self> {
        match paths {
            Ok(paths) => Self::load_if_present(&paths.settings_file()),
            Err(e) => {
                debug!("{}, using default settings", e);
                Ok(Self::default())
            }
        }
    }

    fn load_if_present(file: &Path) -> ConfigResult<Self> {
        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(file)
    }

    /// Load settings from a specific file, which must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.port_timeout_ms)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_millis(self.whois_timeout_ms)
    }
}
