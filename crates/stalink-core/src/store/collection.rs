// ── Generic keyed handle collection ──
//
// Concurrent storage with O(1) lookups and a push-based ordered snapshot.
// Backs both the supervisor's interface table and each interface's
// network handle table.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;

/// A concurrent, observable collection keyed by `K`.
///
/// Every mutation rebuilds the key-ordered snapshot that subscribers
/// receive. A snapshot already handed out is
/// never modified afterwards.
pub(crate) struct HandleCollection<K, T>
where
    K: Clone + Eq + Hash + Ord + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    by_key: DashMap<K, Arc<T>>,

    /// Key-ordered snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<(K, Arc<T>)>>>,
}

impl<K, T> HandleCollection<K, T>
where
    K: Clone + Eq + Hash + Ord + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert unless the key is taken. Returns the stored value, or
    /// `Err` with the existing one.
    pub(crate) fn try_insert(&self, key: K, value: T) -> Result<Arc<T>, Arc<T>> {
        let stored = match self.by_key.entry(key) {
            Entry::Occupied(existing) => return Err(Arc::clone(existing.get())),
            Entry::Vacant(slot) => Arc::clone(slot.insert(Arc::new(value)).value()),
        };
        self.changed();
        Ok(stored)
    }

    /// Return the value for `key`, creating it with `make` if absent.
    pub(crate) fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> T) -> Arc<T> {
        let (value, inserted) = match self.by_key.entry(key) {
            Entry::Occupied(existing) => (Arc::clone(existing.get()), false),
            Entry::Vacant(slot) => (Arc::clone(slot.insert(Arc::new(make())).value()), true),
        };
        if inserted {
            self.changed();
        }
        value
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn remove(&self, key: &K) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.changed();
        }
        removed
    }

    /// Remove everything, returning what was stored.
    pub(crate) fn drain(&self) -> Vec<Arc<T>> {
        let keys: Vec<K> = self.by_key.iter().map(|r| r.key().clone()).collect();
        let drained: Vec<Arc<T>> = keys
            .iter()
            .filter_map(|k| self.by_key.remove(k).map(|(_, v)| v))
            .collect();
        if !drained.is_empty() {
            self.changed();
        }
        drained
    }

    /// Current key-ordered snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<(K, Arc<T>)>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<(K, Arc<T>)>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn changed(&self) {
        let mut values: Vec<(K, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn try_insert_rejects_existing_key() {
        let col: HandleCollection<String, u32> = HandleCollection::new();
        assert_eq!(*col.try_insert("a".into(), 1).unwrap(), 1);
        assert_eq!(*col.try_insert("a".into(), 2).unwrap_err(), 1);
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn get_or_insert_reuses_value() {
        let col: HandleCollection<u32, String> = HandleCollection::new();
        let mut rx = col.subscribe();
        let first = col.get_or_insert_with(1, || "x".into());
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();

        let second = col.get_or_insert_with(1, || "y".into());
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn snapshot_is_key_ordered_and_immutable() {
        let col: HandleCollection<u32, &'static str> = HandleCollection::new();
        col.try_insert(3, "c").unwrap();
        col.try_insert(1, "a").unwrap();
        let before = col.snapshot();

        col.try_insert(2, "b").unwrap();
        let keys: Vec<u32> = col.snapshot().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn remove_and_drain_update_snapshot() {
        let col: HandleCollection<u32, u32> = HandleCollection::new();
        col.try_insert(1, 10).unwrap();
        col.try_insert(2, 20).unwrap();
        assert!(col.remove(&1).is_some());
        assert!(col.remove(&1).is_none());
        let keys: Vec<u32> = col.snapshot().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![2]);

        let drained = col.drain();
        assert_eq!(drained.len(), 1);
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
    }

    #[test]
    fn subscribers_see_changes() {
        let col: HandleCollection<u32, u32> = HandleCollection::new();
        let rx = col.subscribe();
        col.try_insert(5, 50).unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
