//! LRU cache of prepared descriptors
use crate::search::descriptor::SearchDescriptor;
use crate::search::query::PreparedDescriptor;
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => unreachable!(),
};

/// Prepared descriptors keyed by structural descriptor identity, so
/// re-applying an equal descriptor reuses its compiled regex.
pub struct PreparedCache {
    entries: LruCache<SearchDescriptor, Arc<PreparedDescriptor>>,
    hits: u64,
    misses: u64,
}

impl PreparedCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the prepared form of `descriptor`, compiling it on first use.
    pub fn get_or_prepare(&mut self, descriptor: &SearchDescriptor) -> Arc<PreparedDescriptor> {
        if let Some(prepared) = self.entries.get(descriptor) {
            self.hits += 1;
            return Arc::clone(prepared);
        }

        self.misses += 1;
        let prepared = Arc::new(PreparedDescriptor::prepare(descriptor));
        if !prepared.is_valid() {
            debug!(
                "Prepared invalid {} query {:?}; it will match nothing",
                descriptor.mode, descriptor.query
            );
        }
        self.entries.put(descriptor.clone(), Arc::clone(&prepared));
        prepared
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            capacity: self.entries.cap().get(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl Default for PreparedCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_descriptors_share_prepared() {
        let mut cache = PreparedCache::new(4);
        let a = cache.get_or_prepare(&SearchDescriptor::new("alpha"));
        let b = cache.get_or_prepare(&SearchDescriptor::new("alpha"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_eviction() {
        let mut cache = PreparedCache::new(2);
        let first = cache.get_or_prepare(&SearchDescriptor::new("one"));
        cache.get_or_prepare(&SearchDescriptor::new("two"));
        cache.get_or_prepare(&SearchDescriptor::new("three"));
        assert_eq!(cache.stats().size, 2);

        let again = cache.get_or_prepare(&SearchDescriptor::new("one"));
        assert!(!Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        let cache = PreparedCache::new(0);
        assert_eq!(cache.stats().capacity, 64);
    }
}
