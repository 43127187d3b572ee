//! Content-addressed cache of lowered scripts.
//!
//! Entries are keyed by the blake3 hash of the exact source text together
//! with the grammar it was parsed with, so a cached tree is valid for any
//! file with the same contents. Parse errors are never cached.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::syntax::{self, Grammar, ParsedScript};

static GLOBAL: Lazy<Arc<ParseCache>> = Lazy::new(|| Arc::new(ParseCache::unbounded()));

type CacheKey = (blake3::Hash, Grammar);

/// Shared cache of parsed scripts.
pub struct ParseCache {
    entries: Mutex<IndexMap<CacheKey, Arc<ParsedScript>>>,
    capacity: Option<NonZeroUsize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ParseCache {
    /// A cache that never evicts.
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    /// A cache holding at most `capacity` scripts, evicting the least
    /// recently used one. `None` means unbounded.
    pub fn with_capacity(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Process-wide instance used when no cache is injected.
    pub fn global() -> Arc<ParseCache> {
        Arc::clone(&GLOBAL)
    }

    /// Returns the lowered tree for `source`, parsing it on a miss.
    ///
    /// Parsing runs outside the lock. Two callers racing on the same key both
    /// parse and the last insert wins; the results are identical.
    pub fn get_or_parse(
        &self,
        source: &str,
        grammar: Grammar,
    ) -> Result<Arc<ParsedScript>, Vec<String>> {
        let key = (blake3::hash(source.as_bytes()), grammar);

        if let Some(script) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(hash = %key.0.to_hex(), "parse cache hit");
            return Ok(script);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(hash = %key.0.to_hex(), "parse cache miss");
        let script = Arc::new(syntax::parse(source, grammar)?);
        self.insert(key, Arc::clone(&script));
        Ok(script)
    }

    fn lookup(&self, key: &CacheKey) -> Option<Arc<ParsedScript>> {
        let mut entries = self.entries.lock();
        let index = entries.get_index_of(key)?;
        if self.capacity.is_some() {
            let last = entries.len() - 1;
            entries.move_index(index, last);
            return entries.get_index(last).map(|(_, script)| Arc::clone(script));
        }
        entries.get_index(index).map(|(_, script)| Arc::clone(script))
    }

    fn insert(&self, key: CacheKey, script: Arc<ParsedScript>) {
        let mut entries = self.entries.lock();
        entries.shift_remove(&key);
        entries.insert(key, script);
        if let Some(capacity) = self.capacity {
            while entries.len() > capacity.get() {
                entries.shift_remove_index(0);
            }
        }
    }

    /// Number of cached scripts.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Snapshot of the hit and miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.len(),
        )
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Debug for ParseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseCache")
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Parse cache counters.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CacheStats {
    pub hit_rate: f64,
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn new(hits: u64, misses: u64, entries: usize) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self {
            hit_rate,
            hits,
            misses,
            entries,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parse cache:")?;
        writeln!(f, "  Hit rate: {:.1}%", self.hit_rate * 100.0)?;
        writeln!(f, "  Hits: {}", self.hits)?;
        writeln!(f, "  Misses: {}", self.misses)?;
        write!(f, "  Entries: {}", self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "export default { name: 'A' }";

    #[test]
    fn second_lookup_is_a_hit_and_shares_the_tree() {
        let cache = ParseCache::unbounded();
        let first = cache.get_or_parse(SOURCE, Grammar::default()).unwrap();
        let second = cache.get_or_parse(SOURCE, Grammar::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn grammar_is_part_of_the_key() {
        let cache = ParseCache::unbounded();
        cache.get_or_parse(SOURCE, Grammar::default()).unwrap();
        cache
            .get_or_parse(SOURCE, Grammar::new(syntax::Lang::Ts, true))
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn parse_errors_are_not_cached() {
        let cache = ParseCache::unbounded();
        assert!(cache.get_or_parse("export default {", Grammar::default()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let cache = ParseCache::with_capacity(NonZeroUsize::new(2));
        let grammar = Grammar::default();
        cache.get_or_parse("const a = 1", grammar).unwrap();
        cache.get_or_parse("const b = 1", grammar).unwrap();
        cache.get_or_parse("const a = 1", grammar).unwrap();
        cache.get_or_parse("const c = 1", grammar).unwrap();
        assert_eq!(cache.len(), 2);

        cache.get_or_parse("const a = 1", grammar).unwrap();
        assert_eq!(cache.stats().hits, 2);
        cache.get_or_parse("const b = 1", grammar).unwrap();
        assert_eq!(cache.stats().misses, 4);
    }

    #[test]
    fn clear_resets_everything() {
        let cache = ParseCache::unbounded();
        cache.get_or_parse(SOURCE, Grammar::default()).unwrap();
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
