// arena.rs: slot storage keyed by an external id
// O(1) lookup by id; iteration follows slot order, not insertion order.

use ahash::AHashMap;
use slotmap::{DefaultKey, SlotMap};
use std::hash::Hash;

type SmKey = DefaultKey;

#[derive(Debug)]
pub struct Arena<T, Id>
where
    Id: Eq + Hash + Copy,
{
    slab: SlotMap<SmKey, T>,
    // index: Id -> SlotKey
    index: AHashMap<Id, SmKey>,
    // rindex: SlotKey -> Id
    rindex: AHashMap<SmKey, Id>,
}

impl<T, Id> Arena<T, Id>
where
    Id: Eq + Hash + Copy,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slab: SlotMap::with_capacity_and_key(capacity),
            index: AHashMap::with_capacity(capacity),
            rindex: AHashMap::with_capacity(capacity),
        }
    }

    /// Stores `value` under `id`. Replaces and returns the previous value if any.
    pub fn set(&mut self, id: Id, value: T) -> Option<T> {
        if let Some(&k) = self.index.get(&id) {
            if let Some(slot) = self.slab.get_mut(k) {
                return Some(std::mem::replace(slot, value));
            }
        }
        let k = self.slab.insert(value);
        let prev = self.index.insert(id, k);
        let prev_r = self.rindex.insert(k, id);
        debug_assert!(
            prev.is_none() && prev_r.is_none(),
            "arena index out of sync in set()"
        );
        None
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.index.get(&id).and_then(|&k| self.slab.get(k))
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&k) => self.slab.get_mut(k),
            None => None,
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.index.contains_key(&id)
    }

    pub fn remove(&mut self, id: Id) -> Option<T> {
        match self.index.remove(&id) {
            Some(k) => {
                self.rindex.remove(&k);
                self.slab.remove(k)
            }
            None => None,
        }
    }

    /// Iterates `(Id, &T)`.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.slab
            .iter()
            .filter_map(move |(k, v)| self.rindex.get(&k).map(|id| (*id, v)))
    }

    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }
}

impl<T, Id> Default for Arena<T, Id>
where
    Id: Eq + Hash + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}
