//! Join store: values keyed by a pair of identifiers.

use std::collections::HashMap;

use crate::id::Id;
use crate::storage::traits::{IndexedStore, StoreError};

/// Dense `(Id, Id) -> T` mapping, used for region x ion overrides.
#[derive(Debug, Clone)]
pub struct JoinStore<T> {
    values: Vec<T>,
    slot_of: HashMap<(Id, Id), usize>,
    key_at: Vec<(Id, Id)>,
}

impl<T> Default for JoinStore<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            slot_of: HashMap::new(),
            key_at: Vec::new(),
        }
    }
}

fn missing_pair((a, b): (Id, Id)) -> StoreError {
    StoreError::missing(format!("({a}, {b})"))
}

impl<T> JoinStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `(first, second)`; an existing pair is overwritten.
    pub fn add(&mut self, first: Id, second: Id, value: T) -> (Id, Id) {
        let key = (first, second);
        if let Some(&slot) = self.slot_of.get(&key) {
            self.values[slot] = value;
            return key;
        }
        self.slot_of.insert(key, self.values.len());
        self.key_at.push(key);
        self.values.push(value);
        key
    }

    /// Borrow the value for a pair.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if the pair has no slot.
    pub fn get(&self, first: Id, second: Id) -> Result<&T, StoreError> {
        self.find(first, second).ok_or_else(|| missing_pair((first, second)))
    }

    /// Like [`get`](Self::get) but returns `None` for a missing pair.
    #[must_use]
    pub fn find(&self, first: Id, second: Id) -> Option<&T> {
        self.slot_of.get(&(first, second)).map(|&slot| &self.values[slot])
    }

    /// Mutably borrow the value for a pair.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if the pair has no slot.
    pub fn get_mut(&mut self, first: Id, second: Id) -> Result<&mut T, StoreError> {
        match self.slot_of.get(&(first, second)) {
            Some(&slot) => Ok(&mut self.values[slot]),
            None => Err(missing_pair((first, second))),
        }
    }

    /// Removes one pair.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if the pair has no slot.
    pub fn remove(&mut self, first: Id, second: Id) -> Result<T, StoreError> {
        let key = (first, second);
        let slot = self.slot_of.remove(&key).ok_or_else(|| missing_pair(key))?;
        let last = self.values.len() - 1;
        if slot != last {
            let moved = self.key_at[last];
            self.key_at[slot] = moved;
            self.slot_of.insert(moved, slot);
        }
        self.key_at.pop();
        Ok(self.values.swap_remove(slot))
    }

    /// Removes every pair whose first component is `first`.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if the key list names a pair with no slot.
    pub fn remove_by_first(&mut self, first: Id) -> Result<usize, StoreError> {
        self.remove_where(|(a, _)| a == first)
    }

    /// Removes every pair whose second component is `second`.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if the key list names a pair with no slot.
    pub fn remove_by_second(&mut self, second: Id) -> Result<usize, StoreError> {
        self.remove_where(|(_, b)| b == second)
    }

    fn remove_where(&mut self, pred: impl Fn((Id, Id)) -> bool) -> Result<usize, StoreError> {
        let doomed: Vec<(Id, Id)> = self.key_at.iter().copied().filter(|k| pred(*k)).collect();
        for (a, b) in &doomed {
            self.remove(*a, *b)?;
        }
        Ok(doomed.len())
    }

    /// Iterate over `((first, second), value)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = ((Id, Id), &T)> {
        self.key_at.iter().copied().zip(self.values.iter())
    }

    /// Pairs whose first component is `first`.
    pub fn iter_first(&self, first: Id) -> impl Iterator<Item = (Id, &T)> {
        self.iter().filter(move |((a, _), _)| *a == first).map(|((_, b), v)| (b, v))
    }
}

impl<T> IndexedStore for JoinStore<T> {
    type Key = (Id, Id);

    fn len(&self) -> usize {
        self.values.len()
    }

    fn contains(&self, key: (Id, Id)) -> bool {
        self.slot_of.contains_key(&key)
    }

    fn check_invariants(&self) -> Result<(), StoreError> {
        let n = self.values.len();
        if self.slot_of.len() != n || self.key_at.len() != n {
            return Err(StoreError::Corrupted(format!(
                "size mismatch: values={n} key->slot={} slot->key={}",
                self.slot_of.len(),
                self.key_at.len()
            )));
        }
        for (slot, key) in self.key_at.iter().enumerate() {
            if self.slot_of.get(key) != Some(&slot) {
                return Err(StoreError::Corrupted(format!(
                    "({}, {}) does not map back to slot {slot}",
                    key.0, key.1
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_delete_by_either_component() {
        let mut store = JoinStore::new();
        let (r1, r2) = (Id::next(), Id::next());
        let (na, k) = (Id::next(), Id::next());
        store.add(r1, na, 1);
        store.add(r1, k, 2);
        store.add(r2, na, 3);
        store.add(r2, k, 4);

        assert_eq!(store.remove_by_first(r1).unwrap(), 2);
        assert!(store.find(r1, na).is_none());
        assert!(store.find(r1, k).is_none());
        assert_eq!(*store.get(r2, na).unwrap(), 3);
        store.check_invariants().unwrap();

        assert_eq!(store.remove_by_second(na).unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(*store.get(r2, k).unwrap(), 4);
        store.check_invariants().unwrap();
    }

    #[test]
    fn pair_order_matters() {
        let mut store = JoinStore::new();
        let (a, b) = (Id::next(), Id::next());
        store.add(a, b, "ab");
        assert!(store.find(b, a).is_none());
        assert!(matches!(store.get(b, a), Err(StoreError::KeyNotFound(_))));
    }

    #[test]
    fn stale_key_listing_is_reported() {
        let mut store = JoinStore::new();
        let (r, na) = (Id::next(), Id::next());
        store.add(r, na, 1);
        store.key_at.push((r, Id::next()));

        let err = store.remove_by_first(r).unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound(_)));
    }
}
