//! The keyed store abstraction backing backend-local state.

use dashmap::DashMap;

/// A process-local store of values under string keys.
///
/// Both the file-custody records and the auth nonces live behind this trait
/// so the owning services take an injected store instead of ambient maps,
/// which keeps them open to test doubles and durable swaps.
pub trait KeyedStore<V>: Send + Sync {
    /// Returns a copy of the value at `key`.
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key`, returning any displaced value.
    fn put(&self, key: String, value: V) -> Option<V>;

    /// Removes and returns the value at `key`.
    fn delete(&self, key: &str) -> Option<V>;

    /// Removes every entry matching `predicate`, returning the removed pairs.
    fn sweep(&self, predicate: &dyn Fn(&str, &V) -> bool) -> Vec<(String, V)>;
}

/// In-memory [`KeyedStore`] over a sharded concurrent map.
///
/// State is volatile: a process restart drops every entry, which is the
/// documented behavior for nonces and pending-upload records.
#[derive(Debug, Default)]
pub struct MemoryStore<V> {
    entries: DashMap<String, V>,
}

impl<V> MemoryStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }
}

impl<V> KeyedStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: String, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    fn delete(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    fn sweep(&self, predicate: &dyn Fn(&str, &V) -> bool) -> Vec<(String, V)> {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.key(), entry.value()))
            .map(|entry| entry.key().clone())
            .collect();

        doomed
            .into_iter()
            .filter_map(|key| self.entries.remove(&key))
            .collect()
    }
}
