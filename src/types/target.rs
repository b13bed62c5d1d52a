//! Target normalization.
//!
//! Accepts `[scheme://][www.]label(.label)+` where the final label is
//! alphabetic and at least two characters long. The normalized target
//! always carries an explicit scheme: `https://` is preserved, anything
//! else becomes `http://`.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Maximum length of a hostname in characters.
const MAX_HOST_LEN: usize = 253;

/// Maximum length of a single DNS label.
const MAX_LABEL_LEN: usize = 63;

/// URL scheme of a normalized target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// The scheme name without separator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for target validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target '{0}': expected a domain such as example.com or https://www.example.com")]
    Invalid(String),
}

/// A validated scan target: scheme plus host.
///
/// Immutable once constructed. The host is kept exactly as the user typed it
/// (minus the scheme), so `www.` prefixes survive normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: Scheme,
    host: String,
    url: Url,
}

impl Target {
    /// Validate and normalize a raw target string.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        let invalid = || TargetError::Invalid(raw.to_string());

        let (scheme, host) = split_scheme(trimmed);
        if !is_valid_hostname(host) {
            return Err(invalid());
        }

        let url = Url::parse(&format!("{}://{}/", scheme, host)).map_err(|_| invalid())?;

        Ok(Self {
            scheme,
            host: host.to_string(),
            url,
        })
    }

    /// The target's scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The host as supplied, without scheme.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Origin string, e.g. `http://example.com`.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// The origin as a parsed URL with an empty path (`http://example.com/`).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL for a subdomain candidate of this target, e.g. `http://www.example.com`.
    pub fn subdomain_url(&self, label: &str) -> String {
        format!("{}://{}.{}", self.scheme, label, self.host)
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin())
    }
}

/// Split an optional `http://` / `https://` prefix off the input.
fn split_scheme(s: &str) -> (Scheme, &str) {
    for (prefix, scheme) in [("https://", Scheme::Https), ("http://", Scheme::Http)] {
        if let Some(head) = s.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return (scheme, &s[prefix.len()..]);
            }
        }
    }
    (Scheme::Http, s)
}

/// Check a host against the `label(.label)+` grammar.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_HOST_LEN {
        return false;
    }

    let labels: Vec<&str> = s.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let all_labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    // Top-level label must look like a TLD
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    all_labels_ok && tld_ok
}
