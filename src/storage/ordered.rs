//! Unique store with a stable display order.

use crate::id::Id;
use crate::storage::set::IdSet;
use crate::storage::traits::{IndexedStore, StoreError};
use crate::storage::unique::UniqueStore;

/// An [`IdSet`] paired with a [`UniqueStore`]: "all live entities of a kind"
/// plus their values.
#[derive(Debug, Clone)]
pub struct OrderedStore<T> {
    order: IdSet,
    items: UniqueStore<T>,
}

impl<T> Default for OrderedStore<T> {
    fn default() -> Self {
        Self {
            order: IdSet::new(),
            items: UniqueStore::new(),
        }
    }
}

impl<T> OrderedStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `id`; an existing entry keeps its position.
    pub fn add(&mut self, id: Id, value: T) -> Id {
        self.order.add(id);
        self.items.add(id, value)
    }

    /// Removes `id` from both the order and the values.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `id` has no slot.
    pub fn remove(&mut self, id: Id) -> Result<T, StoreError> {
        let value = self.items.remove(id)?;
        self.order.remove(id);
        Ok(value)
    }

    /// Borrow the value stored under `id`.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `id` has no slot.
    pub fn get(&self, id: Id) -> Result<&T, StoreError> {
        self.items.get(id)
    }

    /// Mutably borrow the value stored under `id`.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `id` has no slot.
    pub fn get_mut(&mut self, id: Id) -> Result<&mut T, StoreError> {
        self.items.get_mut(id)
    }

    /// Like [`get`](Self::get) but returns `None` for a missing id.
    #[must_use]
    pub fn find(&self, id: Id) -> Option<&T> {
        self.items.find(id)
    }

    /// Like [`get_mut`](Self::get_mut) but returns `None` for a missing id.
    pub fn find_mut(&mut self, id: Id) -> Option<&mut T> {
        self.items.find_mut(id)
    }

    /// Identifiers in display order.
    #[must_use]
    pub fn ids(&self) -> &[Id] {
        self.order.as_slice()
    }

    /// `(id, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.order
            .iter()
            .filter_map(move |id| self.items.find(id).map(|v| (id, v)))
    }

    /// Identifiers, in display order, whose value satisfies `pred`.
    pub fn ids_where(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<Id> {
        self.iter().filter(|(_, v)| pred(v)).map(|(id, _)| id).collect()
    }

    /// Removes every entry whose value satisfies `pred`, returning them in
    /// display order.
    ///
    /// # Errors
    /// Propagates a lookup failure, which means the store is corrupted.
    pub fn remove_where(&mut self, pred: impl FnMut(&T) -> bool) -> Result<Vec<(Id, T)>, StoreError> {
        let doomed = self.ids_where(pred);
        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed {
            removed.push((id, self.remove(id)?));
        }
        Ok(removed)
    }
}

impl<T> IndexedStore for OrderedStore<T> {
    type Key = Id;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn contains(&self, key: Id) -> bool {
        self.items.contains(key)
    }

    fn check_invariants(&self) -> Result<(), StoreError> {
        self.items.check_invariants()?;
        if self.order.len() != self.items.len() {
            return Err(StoreError::Corrupted(format!(
                "order lists {} ids for {} values",
                self.order.len(),
                self.items.len()
            )));
        }
        match self.order.iter().find(|id| !self.items.contains(*id)) {
            Some(id) => Err(StoreError::Corrupted(format!("{id} ordered but not stored"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_follows_insertion_order() {
        let mut store = OrderedStore::new();
        let ids: Vec<Id> = (0..4).map(|_| Id::next()).collect();
        for (i, id) in ids.iter().enumerate() {
            store.add(*id, i);
        }
        // Removing from the front swaps the last value into slot 0.
        store.remove(ids[0]).unwrap();
        let seen: Vec<usize> = store.iter().map(|(_, v)| *v).collect();
        assert_eq!(seen, vec![1, 2, 3]);
        store.check_invariants().unwrap();
    }

    #[test]
    fn remove_where_collects_first() {
        let mut store = OrderedStore::new();
        for i in 0..6 {
            store.add(Id::next(), i);
        }
        let removed = store.remove_where(|v| v % 2 == 0).unwrap();
        assert_eq!(removed.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(store.len(), 3);
        store.check_invariants().unwrap();
    }
}
