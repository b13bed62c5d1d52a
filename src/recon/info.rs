//! Basic target information: resolved addresses plus WHOIS data.

use super::dns::Resolver;
use super::whois::{WhoisLookup, WhoisRecord};
use crate::error::ReconResult;
use std::fmt;
use std::net::IpAddr;

/// Outcome of the basic-info mode. Each half fails independently.
#[derive(Debug)]
pub struct DomainInfo {
    pub addresses: ReconResult<Vec<IpAddr>>,
    pub whois: ReconResult<WhoisRecord>,
}

impl DomainInfo {
    /// Resolve `host` and look up its registration data.
    pub async fn gather(host: &str, resolver: &dyn Resolver, whois: &dyn WhoisLookup) -> Self {
        let (addresses, whois) = tokio::join!(resolver.lookup_ip(host), whois.lookup(host));
        Self { addresses, whois }
    }
}

impl fmt::Display for DomainInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.addresses {
            Ok(ips) => {
                let ips: Vec<String> = ips.iter().map(IpAddr::to_string).collect();
                writeln!(f, "IP Address: {}", ips.join(", "))?;
            }
            Err(e) => {
                writeln!(f, "IP Address: Not found")?;
                writeln!(f, "An error occurred during IP lookup: {}", e)?;
            }
        }

        match &self.whois {
            Ok(record) => {
                for (key, value) in record.fields() {
                    writeln!(f, "{}: {}", key, value)?;
                }
            }
            Err(e) => writeln!(f, "An error occurred during WHOIS lookup: {}", e)?,
        }

        Ok(())
    }
}
