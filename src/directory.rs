//! Directory discovery from a single page.
//!
//! Fetches the target once, pulls every `<a href>` out of the markup and
//! keeps the links that resolve to a directory-like path (ending in `/`) on
//! the target's own origin. Cross-origin links are excluded.

use crate::discovery::USER_AGENT;
use crate::error::{DiscoveryError, DiscoveryResult};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fetches a page and extracts same-origin directory links.
#[derive(Debug, Clone)]
pub struct DirectoryExtractor {
    client: reqwest::Client,
}

impl DirectoryExtractor {
    /// Create an extractor whose single request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> DiscoveryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DiscoveryError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Fetch `origin` and return its directory-like links.
    ///
    /// Never fails: transport errors and error statuses are logged and
    /// yield an empty set.
    pub async fn discover_directories(&self, origin: &Url) -> BTreeSet<String> {
        let response = match self
            .client
            .get(origin.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Error accessing {}: {}", origin, e);
                return BTreeSet::new();
            }
        };

        // Links resolve against the target even when the fetch was redirected
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Error reading body from {}: {}", origin, e);
                return BTreeSet::new();
            }
        };

        let directories = extract_directories(&body, origin);
        debug!(count = directories.len(), url = %origin, "extracted directory links");
        directories
    }
}

/// Extract directory-like, same-origin links from `html`, resolved against `base`.
pub fn extract_directories(html: &str, base: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return BTreeSet::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_directory(base, href))
        .collect()
}

fn resolve_directory(base: &Url, href: &str) -> Option<String> {
    let mut resolved = base.join(href.trim()).ok()?;

    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    if resolved.origin() != base.origin() {
        return None;
    }
    if !resolved.path().ends_with('/') {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FIXTURE: &str = r#"
        <html><body>
          <a href="/a/">A</a>
          <a href="/b">B</a>
          <a href="http://other.example/c/">C</a>
        </body></html>
    "#;

    #[test]
    fn test_fixture_keeps_only_same_origin_directories() {
        let base = Url::parse("http://example.com").unwrap();
        let dirs = extract_directories(FIXTURE, &base);
        assert_eq!(
            dirs,
            BTreeSet::from(["http://example.com/a/".to_string()])
        );
    }

    #[test]
    fn test_cross_origin_excluded() {
        let base = Url::parse("http://example.com").unwrap();
        let html = r#"<a href="http://other.example/c/">x</a>
                      <a href="https://example.com/secure/">y</a>
                      <a href="http://example.com:8080/alt/">z</a>"#;
        assert!(extract_directories(html, &base).is_empty());
    }

    #[test]
    fn test_relative_links_and_dedup() {
        let base = Url::parse("http://example.com/docs/").unwrap();
        let html = r##"
            <a href="guide/">1</a>
            <a href="guide/#intro">2</a>
            <a href="/docs/guide/">3</a>
            <a href="../">4</a>
            <a href="#top">5</a>
            <a href="mailto:admin@example.com">6</a>
            <a href="javascript:void(0)">7</a>
            <a>no href</a>
        "##;

        let dirs = extract_directories(html, &base);
        assert_eq!(
            dirs,
            BTreeSet::from([
                "http://example.com/".to_string(),
                "http://example.com/docs/".to_string(),
                "http://example.com/docs/guide/".to_string(),
            ])
        );
    }

    async fn serve_once(body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_discover_from_live_page() {
        let origin = serve_once(r#"<a href="/admin/">a</a><a href="/index.html">i</a>"#).await;
        let extractor = DirectoryExtractor::new(Duration::from_secs(5)).unwrap();

        let dirs = extractor.discover_directories(&origin).await;
        assert_eq!(dirs, BTreeSet::from([format!("{}admin/", origin)]));
    }

    #[tokio::test]
    async fn test_redirected_page_resolves_against_target() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let response = if request.starts_with("GET /home/ ") {
                    let body = r#"<a href="sub/">s</a>"#;
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                } else {
                    "HTTP/1.1 302 Found\r\nLocation: /home/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string()
                };
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        let origin = Url::parse(&format!("http://{}/", addr)).unwrap();
        let extractor = DirectoryExtractor::new(Duration::from_secs(5)).unwrap();

        let dirs = extractor.discover_directories(&origin).await;
        assert_eq!(dirs, BTreeSet::from([format!("{}sub/", origin)]));
    }

    #[tokio::test]
    async fn test_unreachable_target_fails_soft() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let extractor = DirectoryExtractor::new(Duration::from_secs(2)).unwrap();
        let origin = Url::parse(&format!("http://{}/", addr)).unwrap();
        assert!(extractor.discover_directories(&origin).await.is_empty());
    }
}
