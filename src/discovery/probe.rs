//! Probe abstraction and the default HTTP implementation.
//!
//! A probe turns one [`Candidate`] into either a [`ProbeOutcome`] or a
//! [`ProbeError`]. Errors are the common case during brute-forcing and are
//! never surfaced individually.

use crate::error::{DiscoveryError, DiscoveryResult, ProbeError, ProbeResult};
use crate::types::Target;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// User agent sent with every discovery request.
pub const USER_AGENT: &str = concat!("mira/", env!("CARGO_PKG_VERSION"));

/// One unit of brute-force work: a subdomain label or an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    /// Create a candidate from a label or URL.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw candidate text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this candidate is already a full http(s) URL.
    pub fn is_url(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A successfully probed candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// The URL that answered.
    pub url: String,
    /// HTTP status of the answer, when the probe speaks HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ProbeOutcome {
    /// Create an outcome without status information.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
        }
    }

    /// Attach the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Trait for probe implementations run by the worker pool.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe a single candidate.
    async fn probe(&self, candidate: &Candidate) -> ProbeResult<ProbeOutcome>;
}

/// Probes `<scheme>://<label>.<host>` with a bounded HTTP GET.
///
/// Any HTTP response counts as success, whatever its status; only failing
/// to get a response at all (DNS, connect, TLS, timeout) drops the candidate.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    target: Target,
    client: reqwest::Client,
}

impl HttpProbe {
    /// Create a probe for subdomains of `target` with the given request timeout.
    pub fn new(target: Target, timeout: Duration) -> DiscoveryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DiscoveryError::Client(e.to_string()))?;

        Ok(Self::with_client(target, client))
    }

    /// Create a probe using an existing HTTP client.
    pub fn with_client(target: Target, client: reqwest::Client) -> Self {
        Self { target, client }
    }

    /// The URL requested for `candidate`.
    pub fn candidate_url(&self, candidate: &Candidate) -> String {
        if candidate.is_url() {
            candidate.as_str().to_string()
        } else {
            self.target.subdomain_url(candidate.as_str())
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, candidate: &Candidate) -> ProbeResult<ProbeOutcome> {
        let url = self.candidate_url(candidate);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(ProbeOutcome::new(url).with_status(response.status().as_u16())),
            Err(e) if e.is_timeout() => Err(ProbeError::Timeout { url }),
            Err(e) if e.is_builder() => Err(ProbeError::InvalidUrl(url)),
            Err(e) => Err(ProbeError::Transport {
                url,
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_for(target: &str) -> HttpProbe {
        HttpProbe::new(Target::parse(target).unwrap(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_candidate_url_from_label() {
        let probe = probe_for("example.com");
        assert_eq!(
            probe.candidate_url(&Candidate::from("www")),
            "http://www.example.com"
        );
    }

    #[test]
    fn test_candidate_url_keeps_https() {
        let probe = probe_for("https://example.com");
        assert_eq!(
            probe.candidate_url(&Candidate::from("api")),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_candidate_url_passthrough() {
        let probe = probe_for("example.com");
        let candidate = Candidate::from("http://example.com/admin/");
        assert!(candidate.is_url());
        assert_eq!(probe.candidate_url(&candidate), "http://example.com/admin/");
    }

    #[tokio::test]
    async fn test_unreachable_candidate_is_error() {
        let probe = probe_for("example.com");
        // Port 1 on loopback is closed on any sane test host
        let result = probe
            .probe(&Candidate::from("http://127.0.0.1:1/"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ProbeOutcome::new("http://www.example.com").with_status(200);
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"url":"http://www.example.com","status":200}"#);

        let json = serde_json::to_string(&ProbeOutcome::new("http://x.example.com")).unwrap();
        assert_eq!(json, r#"{"url":"http://x.example.com"}"#);
    }
}
