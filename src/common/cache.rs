//! Bounded in-memory cache.

use moka::sync::Cache;

/// Thread-safe cache with a fixed capacity, backed by moka.
///
/// Holds recently provisioned flow records so they can be read back
/// without touching the store.
#[derive(Clone)]
pub struct MemCache<K, V> {
    entries: Cache<K, V>,
}

impl<K, V> MemCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Cache::new(capacity as u64),
        }
    }

    pub fn set(
        &self,
        key: K,
        value: V,
    ) {
        self.entries.insert(key, value);
    }

    pub fn get(
        &self,
        key: &K,
    ) -> Option<V> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let cache = MemCache::new(16);
        cache.set("f-1".to_string(), 1);
        assert_eq!(cache.get(&"f-1".to_string()), Some(1));
        assert_eq!(cache.get(&"f-2".to_string()), None);
    }
}
