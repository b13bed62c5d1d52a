//! Hostname resolution.

use crate::error::{ReconError, ReconResult};
use async_trait::async_trait;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Resolves hostnames to addresses.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// All A/AAAA addresses for `host`, in resolver order.
    async fn lookup_ip(&self, host: &str) -> ReconResult<Vec<IpAddr>>;
}

/// Resolver backed by trust-dns with the default upstream configuration.
pub struct DnsResolver {
    inner: TokioAsyncResolver,
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsResolver {
    /// Create a resolver using the default configuration.
    pub fn new() -> Self {
        Self {
            inner: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn lookup_ip(&self, host: &str) -> ReconResult<Vec<IpAddr>> {
        // IP literals need no lookup
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let response = self
            .inner
            .lookup_ip(host)
            .await
            .map_err(|e| ReconError::Dns(format!("failed to resolve '{}': {}", host, e)))?;

        let ips: Vec<IpAddr> = response.iter().collect();
        if ips.is_empty() {
            return Err(ReconError::Dns(format!(
                "no IP addresses found for '{}'",
                host
            )));
        }
        Ok(ips)
    }
}
