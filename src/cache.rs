use crate::data::Analysis;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache key: one analysis per listing code per trading day
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub code: String,
    pub as_of: NaiveDate,
}

impl CacheKey {
    pub fn new(code: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            code: code.into(),
            as_of,
        }
    }
}

struct CacheEntry {
    analysis: Arc<Analysis>,
    inserted: Instant,
}

/// Time-to-live store for derived analyses
///
/// Entries expire `ttl` after insertion; callers can also invalidate a code
/// explicitly. Safe to share between threads.
pub struct SignalCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl SignalCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, if any. Expired entries are removed.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Analysis>> {
        {
            // Guard must be released before removing from the same shard
            let entry = self.entries.get(key)?;
            if entry.inserted.elapsed() < self.ttl {
                return Some(Arc::clone(&entry.analysis));
            }
        }

        // Another thread may have stored a fresh entry in the meantime
        let ttl = self.ttl;
        if self.entries.remove_if(key, |_, entry| entry.inserted.elapsed() >= ttl).is_some() {
            debug!("Cache entry expired for {} as of {}", key.code, key.as_of);
        }
        None
    }

    pub fn insert(&self, key: CacheKey, analysis: Analysis) -> Arc<Analysis> {
        let analysis = Arc::new(analysis);
        self.entries.insert(
            key,
            CacheEntry {
                analysis: Arc::clone(&analysis),
                inserted: Instant::now(),
            },
        );
        analysis
    }

    /// Return the cached analysis or compute, store and return a new one
    ///
    /// Errors from `compute` are passed through and nothing is stored.
    pub fn get_or_try_insert_with<F, E>(&self, key: CacheKey, compute: F) -> Result<Arc<Analysis>, E>
    where
        F: FnOnce() -> Result<Analysis, E>,
    {
        if let Some(hit) = self.get(&key) {
            debug!("Cache hit for {} as of {}", key.code, key.as_of);
            return Ok(hit);
        }

        let analysis = compute()?;
        Ok(self.insert(key, analysis))
    }

    /// Drop every entry for a code, returning how many were removed
    pub fn invalidate(&self, code: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = key.code != code;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.inserted.elapsed() < ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SignalSeries, StatSummary};
    use std::cell::Cell;

    fn analysis(mean: f64) -> Analysis {
        Analysis {
            series: SignalSeries { records: vec![], nominal_window: 77 },
            summary: StatSummary {
                upper_10: 1.0,
                upper_25: 0.5,
                mean,
                lower_25: -0.5,
                lower_10: -1.0,
            },
        }
    }

    fn key(code: &str, day: u32) -> CacheKey {
        CacheKey::new(code, NaiveDate::from_ymd_opt(2024, 7, day).unwrap())
    }

    #[test]
    fn test_compute_once_then_hit() {
        let cache = SignalCache::new(Duration::from_secs(3600));
        let calls = Cell::new(0);

        for _ in 0..3 {
            let result: Result<_, String> = cache.get_or_try_insert_with(key("005930", 1), || {
                calls.set(calls.get() + 1);
                Ok(analysis(0.1))
            });
            assert_eq!(result.unwrap().summary.mean, 0.1);
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_error_not_cached() {
        let cache = SignalCache::new(Duration::from_secs(3600));

        let result: Result<_, String> =
            cache.get_or_try_insert_with(key("005930", 1), || Err("boom".to_string()));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keyed_by_day() {
        let cache = SignalCache::new(Duration::from_secs(3600));
        cache.insert(key("005930", 1), analysis(0.1));

        assert!(cache.get(&key("005930", 1)).is_some());
        assert!(cache.get(&key("005930", 2)).is_none());
    }

    #[test]
    fn test_zero_ttl_always_expired() {
        let cache = SignalCache::new(Duration::ZERO);
        cache.insert(key("005930", 1), analysis(0.1));

        assert!(cache.get(&key("005930", 1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let cache = SignalCache::new(Duration::ZERO);
        cache.insert(key("005930", 1), analysis(0.1));
        cache.insert(key("000660", 1), analysis(0.2));

        assert_eq!(cache.purge_expired(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_code() {
        let cache = SignalCache::new(Duration::from_secs(3600));
        cache.insert(key("005930", 1), analysis(0.1));
        cache.insert(key("005930", 2), analysis(0.2));
        cache.insert(key("000660", 1), analysis(0.3));

        assert_eq!(cache.invalidate("005930"), 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_insert_and_invalidate() {
        let cache = Arc::new(SignalCache::new(Duration::from_secs(3600)));

        let writer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..20_000u32 {
                    cache.insert(key("005930", i % 28 + 1), analysis(0.1));
                    cache.insert(key("000660", i % 28 + 1), analysis(0.2));
                }
            })
        };

        // Nothing matches, so every call must report zero removals
        for _ in 0..20_000 {
            assert_eq!(cache.invalidate("999999"), 0);
            assert_eq!(cache.purge_expired(), 0);
        }

        writer.join().unwrap();
        assert_eq!(cache.len(), 56);
        assert_eq!(cache.invalidate("005930"), 28);
    }
}
