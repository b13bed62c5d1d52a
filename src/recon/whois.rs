//! WHOIS lookups over the plain RFC 3912 protocol.
//!
//! Queries the IANA root server first, follows its `refer:` line to the
//! registry responsible for the TLD, and parses the registry's answer into a
//! [`WhoisRecord`].

use crate::error::{ReconError, ReconResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Default root WHOIS server.
pub const IANA_WHOIS: &str = "whois.iana.org";

const WHOIS_PORT: u16 = 43;

/// Upper bound on a WHOIS answer we are willing to buffer.
const MAX_RESPONSE_SIZE: u64 = 256 * 1024;

/// Parsed subset of a WHOIS answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    pub domain_name: Option<String>,
    pub registrar: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,
    pub name_servers: Vec<String>,
    pub status: Vec<String>,
    pub emails: Vec<String>,
    pub dnssec: Option<String>,
}

impl WhoisRecord {
    /// Report fields in display order, `None` rendered for missing values.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        fn one(v: &Option<String>) -> String {
            v.clone().unwrap_or_else(|| "None".to_string())
        }
        fn many(v: &[String]) -> String {
            if v.is_empty() {
                "None".to_string()
            } else {
                v.join(", ")
            }
        }

        vec![
            ("Domain Name", one(&self.domain_name)),
            ("Registrar", one(&self.registrar)),
            ("Creation Date", one(&self.creation_date)),
            ("Expiration Date", one(&self.expiration_date)),
            ("Last Updated", one(&self.updated_date)),
            ("DNS Servers", many(&self.name_servers)),
            ("Status", many(&self.status)),
            ("Emails", many(&self.emails)),
            ("DNSSEC", one(&self.dnssec)),
        ]
    }
}

/// Looks up registration data for a domain.
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> ReconResult<WhoisRecord>;
}

/// WHOIS client speaking TCP/43.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    root_server: String,
    timeout: Duration,
}

impl WhoisClient {
    /// Create a client starting at `root_server`.
    pub fn new(root_server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            root_server: root_server.into(),
            timeout,
        }
    }

    async fn query(&self, server: &str, domain: &str) -> ReconResult<String> {
        let addr = if server.contains(':') {
            server.to_string()
        } else {
            format!("{}:{}", server, WHOIS_PORT)
        };

        let exchange = async {
            let mut stream = TcpStream::connect(&addr).await?;
            stream.write_all(format!("{}\r\n", domain).as_bytes()).await?;

            let mut raw = Vec::new();
            stream.take(MAX_RESPONSE_SIZE).read_to_end(&mut raw).await?;
            Ok::<_, std::io::Error>(raw)
        };

        let raw = timeout(self.timeout, exchange)
            .await
            .map_err(|_| ReconError::Whois(format!("{} timed out", server)))?
            .map_err(|e| ReconError::Whois(format!("{}: {}", server, e)))?;

        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new(IANA_WHOIS, Duration::from_secs(10))
    }
}

#[async_trait]
impl WhoisLookup for WhoisClient {
    async fn lookup(&self, domain: &str) -> ReconResult<WhoisRecord> {
        let domain = domain.strip_prefix("www.").unwrap_or(domain);

        let root = self.query(&self.root_server, domain).await?;
        let answer = match find_referral(&root) {
            Some(server) if !server.eq_ignore_ascii_case(&self.root_server) => {
                debug!(%server, "following WHOIS referral");
                self.query(&server, domain).await?
            }
            _ => root,
        };

        let record = parse_whois_response(&answer);
        if record == WhoisRecord::default() {
            return Err(ReconError::Whois(format!("no WHOIS data for '{}'", domain)));
        }
        Ok(record)
    }
}

/// Find the `refer:` / `whois:` server named in an IANA answer.
fn find_referral(raw: &str) -> Option<String> {
    raw.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim().to_lowercase();
        let value = value.trim();
        (matches!(key.as_str(), "refer" | "whois") && !value.is_empty())
            .then(|| value.to_string())
    })
}

/// Parse a raw WHOIS answer into structured data.
fn parse_whois_response(raw: &str) -> WhoisRecord {
    let mut record = WhoisRecord::default();

    fn push_unique(list: &mut Vec<String>, value: String) {
        if !value.is_empty() && !list.iter().any(|v| v.eq_ignore_ascii_case(&value)) {
            list.push(value);
        }
    }

    for line in raw.lines() {
        let line = line.trim();
        if line.starts_with('%') || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }

        match key.as_str() {
            "domain name" | "domain" => {
                record.domain_name.get_or_insert(value);
            }
            "registrar" => {
                record.registrar.get_or_insert(value);
            }
            "creation date" | "created" => {
                record.creation_date.get_or_insert(value);
            }
            "registry expiry date"
            | "registrar registration expiration date"
            | "expiration date"
            | "expires" => {
                record.expiration_date.get_or_insert(value);
            }
            "updated date" | "last-modified" | "changed" => {
                record.updated_date.get_or_insert(value);
            }
            "name server" | "nserver" => push_unique(&mut record.name_servers, value),
            "domain status" | "status" => {
                // "clientTransferProhibited https://icann.org/epp#..." keeps only the code
                let code = value.split_whitespace().next().unwrap_or_default().to_string();
                push_unique(&mut record.status, code);
            }
            "dnssec" => {
                record.dnssec.get_or_insert(value);
            }
            k if k.contains("email") => push_unique(&mut record.emails, value),
            _ => {}
        }
    }

    record
}
