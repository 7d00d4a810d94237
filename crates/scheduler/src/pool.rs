use crate::types::{ContextId, SurfaceId};

/// Stable handle for one pool entry. Keys grow monotonically, so a key held
/// past removal never aliases a newer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(u64);

impl InstanceKey {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct PoolEntry<T> {
    pub key: InstanceKey,
    pub surface: SurfaceId,
    pub context: ContextId,
    /// Cleared when the backing context is lost.
    pub active: bool,
    pub target: T,
}

/// Insertion-ordered owner of every live render instance.
#[derive(Debug)]
pub struct InstancePool<T> {
    entries: Vec<PoolEntry<T>>,
    next_key: u64,
}

impl<T> Default for InstancePool<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_key: 0,
        }
    }
}

impl<T> InstancePool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_key: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.active).count()
    }

    /// Appends a new active entry and returns its key.
    pub fn push(&mut self, surface: SurfaceId, context: ContextId, target: T) -> InstanceKey {
        let key = InstanceKey(self.next_key);
        self.next_key += 1;
        self.entries.push(PoolEntry {
            key,
            surface,
            context,
            active: true,
            target,
        });
        key
    }

    pub fn get(&self, key: InstanceKey) -> Option<&PoolEntry<T>> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn get_mut(&mut self, key: InstanceKey) -> Option<&mut PoolEntry<T>> {
        self.entries.iter_mut().find(|entry| entry.key == key)
    }

    pub fn find_by_context(&self, context: ContextId) -> Option<&PoolEntry<T>> {
        self.entries.iter().find(|entry| entry.context == context)
    }

    /// Oldest entry that is still active.
    pub fn oldest_active(&self) -> Option<InstanceKey> {
        self.entries
            .iter()
            .find(|entry| entry.active)
            .map(|entry| entry.key)
    }

    pub fn oldest(&self) -> Option<InstanceKey> {
        self.entries.first().map(|entry| entry.key)
    }

    /// Removes the entry for `key`, keeping the order of the rest.
    pub fn remove(&mut self, key: InstanceKey) -> Option<PoolEntry<T>> {
        let index = self.entries.iter().position(|entry| entry.key == key)?;
        Some(self.entries.remove(index))
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, PoolEntry<T>> {
        self.entries.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolEntry<T>> + '_ {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PoolEntry<T>> + '_ {
        self.entries.iter_mut()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.entries.iter().map(|entry| entry.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_preserves_insertion_order() {
        let mut pool = InstancePool::new();
        let a = pool.push(SurfaceId(1), ContextId(1), "a");
        let b = pool.push(SurfaceId(2), ContextId(2), "b");
        let c = pool.push(SurfaceId(3), ContextId(3), "c");

        assert_eq!(pool.remove(b).map(|entry| entry.target), Some("b"));
        let order: Vec<_> = pool.iter().map(|entry| entry.key).collect();
        assert_eq!(order, [a, c]);
        assert!(pool.remove(b).is_none());
    }

    #[test]
    fn keys_are_never_reused() {
        let mut pool = InstancePool::new();
        let first = pool.push(SurfaceId(1), ContextId(1), ());
        pool.remove(first);
        let second = pool.push(SurfaceId(1), ContextId(2), ());
        assert!(second > first);
        assert!(pool.get(first).is_none());
    }

    #[test]
    fn oldest_active_skips_inactive_entries() {
        let mut pool = InstancePool::new();
        let a = pool.push(SurfaceId(1), ContextId(1), ());
        let b = pool.push(SurfaceId(2), ContextId(2), ());
        if let Some(entry) = pool.get_mut(a) {
            entry.active = false;
        }
        assert_eq!(pool.oldest_active(), Some(b));
        assert_eq!(pool.oldest(), Some(a));
        assert_eq!(pool.active_count(), 1);
        assert_eq!(
            pool.find_by_context(ContextId(2)).map(|entry| entry.key),
            Some(b)
        );
    }
}
