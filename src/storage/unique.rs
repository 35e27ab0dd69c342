//! Unique store: one value per identifier.

use std::collections::HashMap;

use crate::id::Id;
use crate::storage::traits::{IndexedStore, StoreError};

/// Dense `Id -> T` mapping with O(1) swap-remove.
#[derive(Debug, Clone)]
pub struct UniqueStore<T> {
    values: Vec<T>,
    slot_of: HashMap<Id, usize>,
    id_at: Vec<Id>,
}

impl<T> Default for UniqueStore<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            slot_of: HashMap::new(),
            id_at: Vec::new(),
        }
    }
}

impl<T> UniqueStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `id` and returns `id`.
    ///
    /// Adding an identifier that already has a slot replaces its value in
    /// place (last write wins).
    pub fn add(&mut self, id: Id, value: T) -> Id {
        if let Some(&slot) = self.slot_of.get(&id) {
            self.values[slot] = value;
            return id;
        }
        self.slot_of.insert(id, self.values.len());
        self.id_at.push(id);
        self.values.push(value);
        id
    }

    /// Borrow the value stored under `id`.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `id` has no slot.
    pub fn get(&self, id: Id) -> Result<&T, StoreError> {
        self.slot_of
            .get(&id)
            .map(|&slot| &self.values[slot])
            .ok_or_else(|| StoreError::missing(id))
    }

    /// Mutably borrow the value stored under `id`.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `id` has no slot.
    pub fn get_mut(&mut self, id: Id) -> Result<&mut T, StoreError> {
        match self.slot_of.get(&id) {
            Some(&slot) => Ok(&mut self.values[slot]),
            None => Err(StoreError::missing(id)),
        }
    }

    /// Like [`get`](Self::get) but returns `None` for a missing key.
    #[must_use]
    pub fn find(&self, id: Id) -> Option<&T> {
        self.slot_of.get(&id).map(|&slot| &self.values[slot])
    }

    /// Like [`get_mut`](Self::get_mut) but returns `None` for a missing key.
    pub fn find_mut(&mut self, id: Id) -> Option<&mut T> {
        self.slot_of.get(&id).map(|&slot| &mut self.values[slot])
    }

    /// Removes `id`, moving the last value into its slot.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `id` has no slot.
    pub fn remove(&mut self, id: Id) -> Result<T, StoreError> {
        let slot = self.slot_of.remove(&id).ok_or_else(|| StoreError::missing(id))?;
        let last = self.values.len() - 1;
        if slot != last {
            let moved = self.id_at[last];
            self.id_at[slot] = moved;
            self.slot_of.insert(moved, slot);
        }
        self.id_at.pop();
        Ok(self.values.swap_remove(slot))
    }

    /// Iterate over `(id, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.id_at.iter().copied().zip(self.values.iter())
    }

    /// Iterate mutably over `(id, value)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id, &mut T)> {
        self.id_at.iter().copied().zip(self.values.iter_mut())
    }

    /// Identifiers whose value satisfies `pred`.
    pub fn ids_where(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<Id> {
        self.iter().filter(|(_, v)| pred(v)).map(|(id, _)| id).collect()
    }
}

impl<T> IndexedStore for UniqueStore<T> {
    type Key = Id;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn contains(&self, key: Id) -> bool {
        self.slot_of.contains_key(&key)
    }

    fn check_invariants(&self) -> Result<(), StoreError> {
        let n = self.values.len();
        if self.slot_of.len() != n || self.id_at.len() != n {
            return Err(StoreError::Corrupted(format!(
                "size mismatch: values={n} id->slot={} slot->id={}",
                self.slot_of.len(),
                self.id_at.len()
            )));
        }
        for (slot, id) in self.id_at.iter().enumerate() {
            if self.slot_of.get(id) != Some(&slot) {
                return Err(StoreError::Corrupted(format!("{id} does not map back to slot {slot}")));
            }
        }
        Ok(())
    }
}
