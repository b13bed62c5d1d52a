//! TCP connect port scanning.
//!
//! Performs standard TCP connect scans using the operating system's socket
//! API, with a semaphore bounding the number of connection attempts in
//! flight. No elevated privileges are needed.

use super::dns::Resolver;
use crate::error::{ReconError, ReconResult};
use crate::types::{Port, PortSpec};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// A service accepted the connection.
    Open,
    /// The host answered with a reset.
    Closed,
    /// No answer before the timeout, possibly a firewall.
    Filtered,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Result of scanning a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortResult {
    pub port: Port,
    pub state: PortState,
}

/// Whether the host answered on any port at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostState {
    Up,
    Unresponsive,
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Unresponsive => write!(f, "unresponsive"),
        }
    }
}

/// Per-host scan report.
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub ip: IpAddr,
    pub hostname: String,
    pub state: HostState,
    pub protocol: &'static str,
    /// Open ports only, ascending.
    pub ports: Vec<PortResult>,
}

impl HostReport {
    /// Render the report as display lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Host: {} ({})", self.ip, self.hostname),
            format!("State: {}", self.state),
            format!("Protocol: {}", self.protocol),
        ];
        lines.extend(
            self.ports
                .iter()
                .map(|r| format!("Port: {}, State: {}", r.port, r.state)),
        );
        lines
    }
}

/// Port scanning collaborator.
#[async_trait]
pub trait PortScanEngine: Send + Sync {
    /// Scan `host` on every port in `ports`.
    async fn scan(&self, host: &str, ports: &PortSpec) -> ReconResult<Vec<HostReport>>;
}

/// TCP connect scanner.
pub struct TcpConnectEngine {
    resolver: Arc<dyn Resolver>,
    timeout: Duration,
    concurrency: usize,
}

impl TcpConnectEngine {
    /// Create a new TCP connect engine.
    ///
    /// # Arguments
    /// * `resolver` - Resolves the target hostname
    /// * `timeout` - Connection timeout per port
    /// * `concurrency` - Maximum simultaneous connection attempts
    pub fn new(resolver: Arc<dyn Resolver>, timeout: Duration, concurrency: usize) -> Self {
        Self {
            resolver,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    async fn scan_port(&self, ip: IpAddr, port: Port) -> PortResult {
        let addr = SocketAddr::new(ip, port.as_u16());
        let state = match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => PortState::Open,
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => PortState::Closed,
            Ok(Err(_)) | Err(_) => PortState::Filtered,
        };
        PortResult { port, state }
    }
}

#[async_trait]
impl PortScanEngine for TcpConnectEngine {
    async fn scan(&self, host: &str, ports: &PortSpec) -> ReconResult<Vec<HostReport>> {
        let ip = self
            .resolver
            .lookup_ip(host)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ReconError::PortScan(format!("no address for '{}'", host)))?;

        debug!(%ip, spec = %ports, "starting TCP connect scan");
        let ports = ports.to_ports();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let results: Vec<PortResult> = stream::iter(ports)
            .map(|port| {
                let sem = Arc::clone(&semaphore);
                async move {
                    // The semaphore is never closed
                    let _permit = sem.acquire().await.ok();
                    self.scan_port(ip, port).await
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let state = if results.iter().any(|r| r.state != PortState::Filtered) {
            HostState::Up
        } else {
            HostState::Unresponsive
        };

        let mut open: Vec<PortResult> = results
            .into_iter()
            .filter(|r| r.state == PortState::Open)
            .collect();
        open.sort_by_key(|r| r.port);

        Ok(vec![HostReport {
            ip,
            hostname: host.to_string(),
            state,
            protocol: "tcp",
            ports: open,
        }])
    }
}
