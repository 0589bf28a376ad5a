use crate::config::CacheSettings;
use crate::models::NormalizedHobby;
use crate::services::normalizer::{HobbyNormalizer, NormalizationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Normalizer decorator with an in-memory TTL cache
///
/// Entries are keyed by the exact list passed in, so a hit returns what the
/// wrapped normalizer produced for that same list, entry for entry. The
/// matcher canonicalizes lists before normalizing them, which lets repeated
/// rankings share entries. Failures are never cached.
pub struct CachedNormalizer {
    inner: Arc<dyn HobbyNormalizer>,
    cache: moka::future::Cache<Vec<String>, Vec<NormalizedHobby>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedNormalizer {
    /// Wrap a normalizer with a cache of `capacity` lists living `ttl_secs`
    pub fn new(inner: Arc<dyn HobbyNormalizer>, capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            inner,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_settings(inner: Arc<dyn HobbyNormalizer>, settings: &CacheSettings) -> Self {
        Self::new(inner, settings.capacity, settings.ttl_secs)
    }

    /// Drop every cached list
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            size: self.cache.entry_count(),
            hit_count: hits,
            miss_count: misses,
            hit_rate: if lookups > 0 {
                hits as f64 / lookups as f64
            } else {
                0.0
            },
        }
    }
}

#[async_trait]
impl HobbyNormalizer for CachedNormalizer {
    async fn normalize(&self, raw_hobbies: &[String]) -> Result<Vec<NormalizedHobby>, NormalizationError> {
        let key = raw_hobbies.to_vec();

        if let Some(hit) = self.cache.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Normalization cache hit: {:?}", key);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Normalization cache miss: {:?}", key);

        let hobbies = self.inner.normalize(raw_hobbies).await?;
        self.cache.insert(key, hobbies.clone()).await;

        Ok(hobbies)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StaticNormalizer;
    use std::sync::atomic::AtomicUsize;

    struct CountingNormalizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HobbyNormalizer for CountingNormalizer {
        async fn normalize(&self, raw: &[String]) -> Result<Vec<NormalizedHobby>, NormalizationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(raw
                .iter()
                .map(|r| NormalizedHobby::new(r.to_lowercase(), vec![]))
                .collect())
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_repeat_lists_hit_cache() {
        let inner = Arc::new(CountingNormalizer {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedNormalizer::new(inner.clone(), 100, 60);

        let first = cached.normalize(&strings(&["chess", "guitar"])).await.unwrap();
        let second = cached.normalize(&strings(&["chess", "guitar"])).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);

        let stats = cached.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_reordered_list_matches_uncached_output() {
        let uncached = StaticNormalizer::new();
        let cached = CachedNormalizer::new(Arc::new(StaticNormalizer::new()), 100, 60);

        let warm = strings(&["guitar", "chess"]);
        let reordered = strings(&["chess", "guitar", "Guitar"]);

        cached.normalize(&warm).await.unwrap();
        let from_cache = cached.normalize(&reordered).await.unwrap();
        let direct = uncached.normalize(&reordered).await.unwrap();

        assert_eq!(from_cache, direct);
        let tags: Vec<&str> = from_cache.iter().map(|h| h.tag.as_str()).collect();
        assert_eq!(tags, vec!["chess", "guitar", "guitar"]);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let inner = Arc::new(CountingNormalizer {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedNormalizer::new(inner.clone(), 100, 60);

        cached.normalize(&strings(&["chess"])).await.unwrap();
        cached.invalidate_all();
        cached.normalize(&strings(&["chess"])).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
