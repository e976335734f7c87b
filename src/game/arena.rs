//! Key-addressed storage for game objects.
//!
//! Keys are never reused, so a key whose object was removed keeps missing
//! forever. That is what turns a handle into a stale handle.

use rustc_hash::FxHashMap;

/// Identity of an object inside one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u64);

#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    items: FxHashMap<Key, T>,
    next: u64,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            items: FxHashMap::default(),
            next: 0,
        }
    }
}

impl<T> Arena<T> {
    pub(crate) fn insert(&mut self, item: T) -> Key {
        let key = Key(self.next);
        self.next += 1;
        self.items.insert(key, item);
        key
    }

    pub(crate) fn get(&self, key: Key) -> Option<&T> {
        self.items.get(&key)
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.items.get_mut(&key)
    }

    pub(crate) fn remove(&mut self, key: Key) -> Option<T> {
        self.items.remove(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
