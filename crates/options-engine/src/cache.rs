use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Key → value map whose entries go stale `ttl` after insertion
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, (V, Instant)>,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, inserted: Instant, now: Instant) -> bool {
        now.saturating_duration_since(inserted) < self.ttl
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(_, inserted)| self.is_fresh(*inserted, now))
            .map(|(value, _)| value)
    }

    pub fn put(&mut self, key: K, value: V) {
        self.put_at(key, value, Instant::now());
    }

    pub fn put_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (value, now));
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(value, _)| value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop stale entries, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, (_, inserted)| now.saturating_duration_since(*inserted) < ttl);
        before - self.entries.len()
    }

    /// All keys, stale or not
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_returned() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.put("AAPL".to_string(), 1);
        assert_eq!(cache.get(&"AAPL".to_string()), Some(&1));
        assert_eq!(cache.get(&"MSFT".to_string()), None);
    }

    #[test]
    fn test_stale_entry_hidden_then_purged() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let start = Instant::now();
        cache.put_at("AAPL", 1, start);
        cache.put_at("MSFT", 2, start + Duration::from_secs(30));

        let later = start + Duration::from_secs(61);
        assert_eq!(cache.get_at(&"AAPL", later), None);
        assert_eq!(cache.get_at(&"MSFT", later), Some(&2));
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.purge_expired_at(later), 1);
        assert_eq!(cache.keys(), vec!["MSFT"]);
    }

    #[test]
    fn test_clear_and_remove() {
        let mut cache: TtlCache<&str, i32> = TtlCache::default();
        assert_eq!(cache.ttl(), DEFAULT_TTL);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.remove(&"a"), Some(1));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_never_fresh() {
        let mut cache = TtlCache::new(Duration::ZERO);
        cache.put(1u8, "x");
        assert_eq!(cache.get(&1), None);
    }
}
