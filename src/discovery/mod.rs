//! Concurrent subdomain discovery.
//!
//! The [`DiscoveryScanner`] seeds a fresh [`WorkQueue`] from a wordlist,
//! starts a [`ProbePool`] against a fresh [`ResultCollector`], waits for the
//! queue to drain and returns what the workers found. Nothing is shared
//! between two calls to [`DiscoveryScanner::scan`].

mod collector;
mod pool;
mod probe;
mod queue;

pub use collector::ResultCollector;
pub use pool::ProbePool;
pub use probe::{Candidate, HttpProbe, Probe, ProbeOutcome, USER_AGENT};
pub use queue::{Ticket, WorkQueue};

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::types::Target;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Read a newline-delimited wordlist into candidates.
///
/// Lines are trimmed; blank lines are skipped.
pub async fn load_wordlist(path: &Path) -> DiscoveryResult<Vec<Candidate>> {
    let not_found = |source| DiscoveryError::WordlistNotFound {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::open(path).await.map_err(not_found)?;
    let mut lines = BufReader::new(file).lines();

    let mut candidates = Vec::new();
    while let Some(line) = lines.next_line().await.map_err(not_found)? {
        let word = line.trim();
        if !word.is_empty() {
            candidates.push(Candidate::new(word));
        }
    }

    Ok(candidates)
}

/// Orchestrates one brute-force discovery run per call.
pub struct DiscoveryScanner {
    probe: Arc<dyn Probe>,
    worker_count: usize,
    show_progress: bool,
}

impl DiscoveryScanner {
    /// Create a scanner around any probe implementation.
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self {
            probe,
            worker_count: ProbePool::DEFAULT_WORKERS,
            show_progress: false,
        }
    }

    /// Create a scanner that probes subdomains of `target` over HTTP.
    pub fn for_target(target: Target, timeout: Duration) -> DiscoveryResult<Self> {
        let probe = HttpProbe::new(target, timeout)?;
        Ok(Self::new(Arc::new(probe)))
    }

    /// Set the number of concurrent workers.
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Show a progress bar while scanning.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Configured worker count.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Load `wordlist` and probe every entry.
    pub async fn scan(&self, wordlist: impl AsRef<Path>) -> DiscoveryResult<Vec<ProbeOutcome>> {
        let candidates = load_wordlist(wordlist.as_ref()).await?;
        self.scan_candidates(candidates).await
    }

    /// Probe an already-built list of candidates.
    pub async fn scan_candidates(
        &self,
        candidates: Vec<Candidate>,
    ) -> DiscoveryResult<Vec<ProbeOutcome>> {
        if self.worker_count == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }

        let start = Instant::now();
        let total = candidates.len();

        let queue = Arc::new(WorkQueue::new());
        let collector = Arc::new(ResultCollector::new());
        for candidate in candidates {
            queue.enqueue(candidate);
        }

        let progress = self.show_progress.then(|| progress_bar(total as u64));

        let pool = ProbePool::start(
            self.worker_count,
            Arc::clone(&queue),
            Arc::clone(&collector),
            Arc::clone(&self.probe),
            progress.clone(),
        );

        queue.wait_until_drained().await;
        pool.shutdown().await;

        if let Some(pb) = progress {
            pb.finish_with_message("Scan complete");
        }

        let results = collector.snapshot();
        info!(
            candidates = total,
            found = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "discovery scan finished"
        );

        Ok(results)
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::Write;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::{TcpListener, TcpStream};

    /// Resolves a fixed set of hostnames to local listeners and connects.
    struct LocalResolverProbe {
        target: Target,
        hosts: HashMap<String, SocketAddr>,
    }

    #[async_trait]
    impl Probe for LocalResolverProbe {
        async fn probe(&self, candidate: &Candidate) -> ProbeResult<ProbeOutcome> {
            let url = self.target.subdomain_url(candidate.as_str());
            let host = format!("{}.{}", candidate, self.target.host());
            let addr = self.hosts.get(&host).ok_or_else(|| ProbeError::Transport {
                url: url.clone(),
                reason: "name does not resolve".to_string(),
            })?;

            match tokio::time::timeout(Duration::from_secs(2), TcpStream::connect(addr)).await {
                Ok(Ok(_stream)) => Ok(ProbeOutcome::new(url)),
                Ok(Err(e)) => Err(ProbeError::Transport {
                    url,
                    reason: e.to_string(),
                }),
                Err(_) => Err(ProbeError::Timeout { url }),
            }
        }
    }

    /// Fails every candidate, counting calls.
    struct RefusingProbe {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Probe for RefusingProbe {
        async fn probe(&self, candidate: &Candidate) -> ProbeResult<ProbeOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProbeError::Transport {
                url: candidate.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    fn wordlist(lines: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(lines.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_wordlist_trims_and_skips_blank_lines() {
        let file = wordlist("www\n  mail  \n\n\tdev\t\n");
        let candidates = load_wordlist(file.path()).await.unwrap();
        let words: Vec<&str> = candidates.iter().map(Candidate::as_str).collect();
        assert_eq!(words, vec!["www", "mail", "dev"]);
    }

    #[tokio::test]
    async fn test_missing_wordlist() {
        let scanner = DiscoveryScanner::new(Arc::new(RefusingProbe {
            calls: AtomicUsize::new(0),
        }));
        let result = scanner.scan("/nonexistent/mira/subdomains.txt").await;
        assert!(matches!(
            result,
            Err(DiscoveryError::WordlistNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let scanner = DiscoveryScanner::new(Arc::new(RefusingProbe {
            calls: AtomicUsize::new(0),
        }))
        .with_workers(0);
        let result = scanner.scan_candidates(vec![Candidate::from("www")]).await;
        assert!(matches!(result, Err(DiscoveryError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_empty_wordlist_yields_nothing() {
        let file = wordlist("\n\n");
        let scanner = DiscoveryScanner::new(Arc::new(RefusingProbe {
            calls: AtomicUsize::new(0),
        }));
        assert!(scanner.scan(file.path()).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_only_resolvable_subdomain_is_found() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        let target = Target::parse("example.com").unwrap();
        let hosts = HashMap::from([("www.example.com".to_string(), addr)]);
        let probe = LocalResolverProbe {
            target: target.clone(),
            hosts,
        };

        let file = wordlist("www\nmail\ndoesnotexist12345\n");
        let results = DiscoveryScanner::new(Arc::new(probe))
            .scan(file.path())
            .await
            .unwrap();

        assert_eq!(results, vec![ProbeOutcome::new("http://www.example.com")]);
    }

    #[tokio::test]
    async fn test_repeated_scans_are_independent() {
        let probe = Arc::new(RefusingProbe {
            calls: AtomicUsize::new(0),
        });
        let scanner = DiscoveryScanner::new(probe.clone()).with_workers(4);
        let file = wordlist("www\nmail\ndoesnotexist12345\n");

        let first = scanner.scan(file.path()).await.unwrap();
        assert!(first.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);

        let second = scanner.scan(file.path()).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_candidate_probed_exactly_once() {
        struct CountingProbe {
            seen: std::sync::Mutex<HashMap<String, usize>>,
        }

        #[async_trait]
        impl Probe for CountingProbe {
            async fn probe(&self, candidate: &Candidate) -> ProbeResult<ProbeOutcome> {
                tokio::task::yield_now().await;
                *self
                    .seen
                    .lock()
                    .unwrap()
                    .entry(candidate.to_string())
                    .or_default() += 1;
                Ok(ProbeOutcome::new(candidate.to_string()))
            }
        }

        for workers in [1usize, 2, 10, 64] {
            let probe = Arc::new(CountingProbe {
                seen: std::sync::Mutex::new(HashMap::new()),
            });
            let candidates: Vec<Candidate> =
                (0..300).map(|i| Candidate::new(format!("host{i}"))).collect();

            let results = DiscoveryScanner::new(probe.clone())
                .with_workers(workers)
                .scan_candidates(candidates)
                .await
                .unwrap();

            assert_eq!(results.len(), 300);
            let seen = probe.seen.lock().unwrap();
            assert_eq!(seen.len(), 300);
            assert!(seen.values().all(|&count| count == 1));
        }
    }
}
