//! Thread-safe accumulator for successful probe outcomes.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A lock-protected sequence, appended to by many workers at once.
///
/// Entries appear in completion order, which depends on probe latency and
/// differs between runs.
#[derive(Debug)]
pub struct ResultCollector<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for ResultCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultCollector<T> {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one outcome.
    pub fn append(&self, item: T) {
        self.lock().push(item);
    }

    /// Number of collected outcomes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consume the collector, returning its contents.
    pub fn into_inner(self) -> Vec<T> {
        self.items.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> ResultCollector<T> {
    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_append_and_snapshot() {
        let collector = ResultCollector::new();
        assert!(collector.is_empty());

        collector.append("http://www.example.com".to_string());
        collector.append("http://mail.example.com".to_string());

        assert_eq!(collector.len(), 2);
        assert_eq!(
            collector.snapshot(),
            vec!["http://www.example.com", "http://mail.example.com"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_lose_nothing() {
        const TASKS: usize = 8;
        const PER_TASK: usize = 500;

        let collector = Arc::new(ResultCollector::new());
        let handles: Vec<_> = (0..TASKS)
            .map(|task| {
                let collector = Arc::clone(&collector);
                tokio::spawn(async move {
                    for i in 0..PER_TASK {
                        collector.append(task * PER_TASK + i);
                        if i % 50 == 0 {
                            tokio::task::yield_now().await;
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.len(), TASKS * PER_TASK);
        let unique: HashSet<_> = snapshot.iter().copied().collect();
        assert_eq!(unique.len(), TASKS * PER_TASK);
    }

    #[test]
    fn test_concurrent_appends_from_threads() {
        let collector = Arc::new(ResultCollector::new());
        let threads: Vec<_> = (0..4)
            .map(|t| {
                let collector = Arc::clone(&collector);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        collector.append((t, i));
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        let collector = Arc::try_unwrap(collector).unwrap();
        assert_eq!(collector.into_inner().len(), 1000);
    }
}
