use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;

use crate::error::Result;
use crate::models::{QueryScope, RetrievalBackend, RetrievalSource};

/// Fully resolved result of one retrieval call, shared between all callers
/// that asked the same question within the TTL window.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub answer: String,
    pub sources: Vec<RetrievalSource>,
}

struct CacheSlot {
    cell: Arc<OnceCell<Arc<RetrievalOutcome>>>,
    created_at: Instant,
}

/// De-duplicates identical retrieval requests.
///
/// Callers that ask with exactly the same key while a fetch is outstanding
/// attach to the same pending cell instead of issuing a second call.
/// Staleness is checked lazily at lookup time; there is no background
/// sweep. Capacity is bounded LRU so the map cannot grow without limit.
/// Failed fetches leave the cell empty, so the next caller retries.
pub struct QueryCache {
    entries: Mutex<LruCache<String, CacheSlot>>,
    ttl: Duration,
}

impl QueryCache {
    /// # Panics
    /// Panics if capacity is 0
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let entries = LruCache::new(NonZeroUsize::new(capacity).expect("Capacity must be non-zero"));
        Self {
            entries: Mutex::new(entries),
            ttl,
        }
    }

    /// Canonical key over everything that makes a query distinct: backend,
    /// scope, model, and the verbatim question text.
    pub fn key(
        backend: RetrievalBackend,
        scope: &QueryScope,
        model: &str,
        question: &str,
    ) -> String {
        let mut hasher = DefaultHasher::new();
        question.as_bytes().hash(&mut hasher);
        format!(
            "{backend}:{}:{model}:{:x}",
            scope.cache_label(),
            hasher.finish()
        )
    }

    /// Returns the cached outcome for `key`, or runs `producer` to fill it.
    ///
    /// The second tuple element reports whether the value was already
    /// resolved before this call.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        producer: F,
    ) -> Result<(Arc<RetrievalOutcome>, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RetrievalOutcome>>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap();
            match entries.get(key) {
                Some(slot) if slot.created_at.elapsed() < self.ttl => Arc::clone(&slot.cell),
                _ => {
                    let slot = CacheSlot {
                        cell: Arc::new(OnceCell::new()),
                        created_at: Instant::now(),
                    };
                    let cell = Arc::clone(&slot.cell);
                    entries.put(key.to_string(), slot);
                    cell
                }
            }
        };

        let cache_hit = cell.initialized();
        let value = cell
            .get_or_try_init(|| async move { producer().await.map(Arc::new) })
            .await?;

        Ok((Arc::clone(value), cache_hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn outcome(answer: &str) -> RetrievalOutcome {
        RetrievalOutcome {
            answer: answer.to_string(),
            sources: Vec::new(),
        }
    }

    fn minutes(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }

    #[tokio::test]
    async fn test_second_call_reuses_first_result() {
        let cache = QueryCache::new(8, minutes(5));
        let calls = AtomicUsize::new(0);

        let (first, hit_a) = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(outcome("answer"))
            })
            .await
            .unwrap();
        let (second, hit_b) = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(outcome("other"))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!hit_a);
        assert!(hit_b);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = Arc::new(QueryCache::new(8, minutes(5)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("k", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(outcome("shared"))
                    })
                    .await
                    .unwrap()
                    .0
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], result));
        }
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let cache = QueryCache::new(8, Duration::ZERO);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(outcome("answer"))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = QueryCache::new(8, minutes(5));
        let calls = AtomicUsize::new(0);

        let failed = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(crate::error::TomeError::Retrieval("boom".to_string()))
            })
            .await;
        assert!(failed.is_err());

        let (value, hit) = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(outcome("recovered"))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(value.answer, "recovered");
        assert!(!hit);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache = QueryCache::new(8, minutes(5));
        let calls = AtomicUsize::new(0);

        for key in ["a", "b"] {
            cache
                .get_or_fetch(key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(outcome(key))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_key_varies_with_every_component() {
        let scope = QueryScope::AllDocuments;
        let doc_scope = QueryScope::Document("doc-1".to_string());
        let base = QueryCache::key(RetrievalBackend::Vector, &scope, "m", "q");

        assert_ne!(
            base,
            QueryCache::key(RetrievalBackend::Vision, &scope, "m", "q")
        );
        assert_ne!(
            base,
            QueryCache::key(RetrievalBackend::Vector, &doc_scope, "m", "q")
        );
        assert_ne!(
            base,
            QueryCache::key(RetrievalBackend::Vector, &scope, "other", "q")
        );
        assert_ne!(
            base,
            QueryCache::key(RetrievalBackend::Vector, &scope, "m", "q2")
        );
        assert_eq!(
            base,
            QueryCache::key(RetrievalBackend::Vector, &scope, "m", "q")
        );
    }
}
