//! Web technology fingerprinting.
//!
//! Two collaborators are merged into one report: a built-in matcher that
//! inspects response headers and markup, and the external `whatweb` tool.

use crate::discovery::USER_AGENT;
use crate::error::{ReconError, ReconResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, SERVER, SET_COOKIE};
use scraper::{Html, Selector};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use url::Url;

/// Detected technologies grouped by category.
pub type TechMap = BTreeMap<String, BTreeSet<String>>;

/// A technology fingerprinting collaborator.
#[async_trait]
pub trait Fingerprinter: Send + Sync {
    /// Short name shown in the report.
    fn name(&self) -> &'static str;

    /// Fingerprint `url`, returning display lines.
    async fn fingerprint(&self, url: &Url) -> ReconResult<Vec<String>>;
}

/// Markup substrings (matched lowercase) and what they reveal.
const MARKUP_SIGNATURES: &[(&str, &str, &str)] = &[
    ("/wp-content/", "cms", "WordPress"),
    ("/wp-includes/", "cms", "WordPress"),
    ("/sites/default/files", "cms", "Drupal"),
    ("/media/jui/", "cms", "Joomla"),
    ("cdn.shopify.com", "ecommerce", "Shopify"),
    ("/skin/frontend/", "ecommerce", "Magento"),
    ("jquery", "javascript-frameworks", "jQuery"),
    ("react-dom", "javascript-frameworks", "React"),
    ("data-reactroot", "javascript-frameworks", "React"),
    ("ng-version", "javascript-frameworks", "Angular"),
    ("vue.js", "javascript-frameworks", "Vue.js"),
    ("data-v-app", "javascript-frameworks", "Vue.js"),
    ("__next_data__", "web-frameworks", "Next.js"),
    ("bootstrap", "web-frameworks", "Twitter Bootstrap"),
    ("google-analytics.com", "analytics", "Google Analytics"),
    ("googletagmanager.com", "analytics", "Google Tag Manager"),
    ("cloudflare", "cdn", "Cloudflare"),
];

/// Session cookie names and the stack they imply.
const COOKIE_SIGNATURES: &[(&str, &str, &str)] = &[
    ("phpsessid", "programming-languages", "PHP"),
    ("jsessionid", "programming-languages", "Java"),
    ("asp.net_sessionid", "web-frameworks", "Microsoft ASP.NET"),
    ("laravel_session", "web-frameworks", "Laravel"),
    ("csrftoken", "web-frameworks", "Django"),
    ("_rails_session", "web-frameworks", "Ruby on Rails"),
];

/// Detect technologies from response headers and body.
pub fn detect(headers: &HeaderMap, html: &str) -> TechMap {
    let mut found = TechMap::new();
    let mut add = |category: &str, tech: &str| {
        found
            .entry(category.to_string())
            .or_default()
            .insert(tech.to_string());
    };

    if let Some(server) = headers.get(SERVER).and_then(|v| v.to_str().ok()) {
        add("web-servers", server.trim());
    }
    for name in ["x-powered-by", "x-generator"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            add("web-frameworks", value.trim());
        }
    }
    if headers.contains_key("x-aspnet-version") {
        add("web-frameworks", "Microsoft ASP.NET");
    }

    for cookie in headers.get_all(SET_COOKIE).iter().filter_map(|v| v.to_str().ok()) {
        let cookie = cookie.to_lowercase();
        for &(name, category, tech) in COOKIE_SIGNATURES {
            if cookie.starts_with(&format!("{}=", name)) {
                add(category, tech);
            }
        }
    }

    let document = Html::parse_document(html);
    if let Ok(selector) = Selector::parse("meta[name][content]") {
        for meta in document.select(&selector) {
            let meta = meta.value();
            let is_generator = meta
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("generator"));
            if let (true, Some(content)) = (is_generator, meta.attr("content")) {
                add("cms", content.trim());
            }
        }
    }

    let lowered = html.to_lowercase();
    for &(needle, category, tech) in MARKUP_SIGNATURES {
        if lowered.contains(needle) {
            add(category, tech);
        }
    }

    found
}

/// Render a technology map as `category: a, b` lines.
pub fn format_tech_map(map: &TechMap) -> Vec<String> {
    map.iter()
        .map(|(category, techs)| {
            let techs: Vec<&str> = techs.iter().map(String::as_str).collect();
            format!("{}: {}", category, techs.join(", "))
        })
        .collect()
}

/// Built-in fingerprinter working from one HTTP response.
#[derive(Debug, Clone)]
pub struct HeaderFingerprinter {
    client: reqwest::Client,
}

impl HeaderFingerprinter {
    /// Create a fingerprinter whose request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> ReconResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fingerprinter for HeaderFingerprinter {
    fn name(&self) -> &'static str {
        "built-in"
    }

    async fn fingerprint(&self, url: &Url) -> ReconResult<Vec<String>> {
        let response = self.client.get(url.clone()).send().await?;
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(format_tech_map(&detect(&headers, &body)))
    }
}

/// Runs the external `whatweb` command.
#[derive(Debug, Clone)]
pub struct WhatWeb {
    program: String,
    timeout: Duration,
}

impl WhatWeb {
    /// Run `program` (normally `whatweb`) with the given time limit.
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Fingerprinter for WhatWeb {
    fn name(&self) -> &'static str {
        "whatweb"
    }

    async fn fingerprint(&self, url: &Url) -> ReconResult<Vec<String>> {
        let mut command = Command::new(&self.program);
        command
            .arg("--color=never")
            .arg(url.as_str())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Err(_) => {
                return Err(ReconError::Fingerprint(format!(
                    "{} timed out after {:?}",
                    self.program, self.timeout
                )))
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ReconError::CommandNotFound(self.program.clone()))
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(ReconError::CommandFailed {
                command: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(format_whatweb_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Split whatweb's comma-separated plugin list into lines, leaving commas
/// inside `[...]` alone.
pub fn format_whatweb_output(output: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in output.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// One fingerprinter's contribution to the merged report.
#[derive(Debug)]
pub struct TechSection {
    pub source: &'static str,
    pub result: ReconResult<Vec<String>>,
}

/// Run every fingerprinter against `url`, keeping failures per section.
pub async fn analyze(url: &Url, fingerprinters: &[Box<dyn Fingerprinter>]) -> Vec<TechSection> {
    let mut sections = Vec::with_capacity(fingerprinters.len());
    for fingerprinter in fingerprinters {
        sections.push(TechSection {
            source: fingerprinter.name(),
            result: fingerprinter.fingerprint(url).await,
        });
    }
    sections
}
