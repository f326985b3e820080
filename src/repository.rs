//! Generic insert-only keyed repository.
//!
//! Mirrors `object_repository<K,V>`: a mutex-guarded map that never removes
//! entries, used for the global sink/channel/logger registries.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::hash::Hash;

pub struct Repository<K, V> {
    inner: Mutex<AHashMap<K, V>>,
}

impl<K, V> Default for Repository<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Repository { inner: Mutex::new(AHashMap::new()) }
    }
}

impl<K, V> Repository<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key` if absent, returning the (possibly
    /// just-inserted) existing value either way — repositories never
    /// overwrite an existing entry.
    pub fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> V) -> V {
        let mut guard = self.inner.lock();
        if let Some(existing) = guard.get(&key) {
            return existing.clone();
        }
        let value = make();
        guard.insert(key, value.clone());
        value
    }

    /// Inserts `value` under `key` only if absent. Returns `false` without
    /// touching the existing entry if `key` is already taken — the
    /// `install_custom_sink`-style contract, distinct from
    /// [`Self::get_or_insert_with`] which always hands back *a* value.
    pub fn try_insert(&self, key: K, value: V) -> bool {
        let mut guard = self.inner.lock();
        if guard.contains_key(&key) {
            return false;
        }
        guard.insert(key, value);
        true
    }

    pub fn find(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Snapshot of every stored value, in unspecified order (matching the
    /// underlying hash map's iteration order).
    pub fn contents(&self) -> Vec<V> {
        self.inner.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_once_keeps_first_value() {
        let repo: Repository<String, i32> = Repository::new();
        let first = repo.get_or_insert_with("a".to_string(), || 1);
        let second = repo.get_or_insert_with("a".to_string(), || 2);
        assert_eq!(first, 1);
        assert_eq!(second, 1);
    }

    #[test]
    fn find_returns_none_for_missing_key() {
        let repo: Repository<String, i32> = Repository::new();
        assert!(repo.find(&"missing".to_string()).is_none());
    }

    #[test]
    fn try_insert_rejects_duplicate_key_and_keeps_the_first_value() {
        let repo: Repository<String, i32> = Repository::new();
        assert!(repo.try_insert("a".to_string(), 1));
        assert!(!repo.try_insert("a".to_string(), 2));
        assert_eq!(repo.find(&"a".to_string()), Some(1));
    }
}
