//! Many store: ordered children per parent identifier.

use std::collections::HashMap;

use crate::id::Id;
use crate::storage::traits::{IndexedStore, StoreError};

/// Parent `Id` -> ordered child `Id`s, each child owning a dense value slot.
///
/// The parent identifier is only a key; the store does not require the
/// parent to live anywhere in particular.
#[derive(Debug, Clone)]
pub struct ManyStore<T> {
    values: Vec<T>,
    slot_of: HashMap<Id, usize>,
    id_at: Vec<Id>,
    parent_of: HashMap<Id, Id>,
    children: HashMap<Id, Vec<Id>>,
}

impl<T> Default for ManyStore<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            slot_of: HashMap::new(),
            id_at: Vec::new(),
            parent_of: HashMap::new(),
            children: HashMap::new(),
        }
    }
}

impl<T> ManyStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a child under `parent`, issuing a fresh child identifier.
    pub fn add(&mut self, parent: Id, value: T) -> Id {
        self.insert(parent, Id::next(), value)
    }

    /// Adds `child` under `parent` with a caller-issued identifier.
    ///
    /// An existing child is overwritten and, if needed, moved to `parent`.
    pub fn insert(&mut self, parent: Id, child: Id, value: T) -> Id {
        if let Some(&slot) = self.slot_of.get(&child) {
            self.values[slot] = value;
            let old = self.parent_of.insert(child, parent);
            if old != Some(parent) {
                if let Some(old) = old {
                    self.unlink(old, child);
                }
                self.children.entry(parent).or_default().push(child);
            }
            return child;
        }
        self.slot_of.insert(child, self.values.len());
        self.id_at.push(child);
        self.values.push(value);
        self.parent_of.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
        child
    }

    /// Borrow a child's value.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `child` has no slot.
    pub fn get(&self, child: Id) -> Result<&T, StoreError> {
        self.slot_of
            .get(&child)
            .map(|&slot| &self.values[slot])
            .ok_or_else(|| StoreError::missing(child))
    }

    /// Mutably borrow a child's value.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `child` has no slot.
    pub fn get_mut(&mut self, child: Id) -> Result<&mut T, StoreError> {
        match self.slot_of.get(&child) {
            Some(&slot) => Ok(&mut self.values[slot]),
            None => Err(StoreError::missing(child)),
        }
    }

    /// Parent of `child`, if the child exists.
    #[must_use]
    pub fn parent(&self, child: Id) -> Option<Id> {
        self.parent_of.get(&child).copied()
    }

    /// Children of `parent` in insertion order. Empty for unknown parents.
    #[must_use]
    pub fn children(&self, parent: Id) -> &[Id] {
        self.children.get(&parent).map_or(&[], Vec::as_slice)
    }

    /// Child values of `parent` in insertion order.
    pub fn values_of(&self, parent: Id) -> impl Iterator<Item = (Id, &T)> {
        self.children(parent)
            .iter()
            .map(move |&child| (child, &self.values[self.slot_of[&child]]))
    }

    /// Removes one child. Other children keep their identifiers.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if `child` has no slot.
    pub fn remove(&mut self, child: Id) -> Result<T, StoreError> {
        let slot = self.slot_of.remove(&child).ok_or_else(|| StoreError::missing(child))?;
        let last = self.values.len() - 1;
        if slot != last {
            let moved = self.id_at[last];
            self.id_at[slot] = moved;
            self.slot_of.insert(moved, slot);
        }
        self.id_at.pop();
        if let Some(parent) = self.parent_of.remove(&child) {
            self.unlink(parent, child);
        }
        Ok(self.values.swap_remove(slot))
    }

    /// Removes every child of `parent` and returns how many were removed.
    ///
    /// # Errors
    /// `StoreError::KeyNotFound` if a listed child has no slot, which means
    /// the child lists and the slot map disagree.
    pub fn remove_children(&mut self, parent: Id) -> Result<usize, StoreError> {
        // Removal edits the child list, so take a copy first.
        let doomed: Vec<Id> = self.children(parent).to_vec();
        for child in &doomed {
            self.remove(*child)?;
        }
        self.children.remove(&parent);
        Ok(doomed.len())
    }

    /// Iterate over `(parent, child, value)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, Id, &T)> {
        self.id_at
            .iter()
            .zip(self.values.iter())
            .map(move |(child, value)| (self.parent_of[child], *child, value))
    }

    /// Number of distinct parents with at least one child.
    #[must_use]
    pub fn parent_count(&self) -> usize {
        self.children.len()
    }

    fn unlink(&mut self, parent: Id, child: Id) {
        if let Some(list) = self.children.get_mut(&parent) {
            list.retain(|c| *c != child);
            if list.is_empty() {
                self.children.remove(&parent);
            }
        }
    }
}

impl<T> IndexedStore for ManyStore<T> {
    type Key = Id;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn contains(&self, key: Id) -> bool {
        self.slot_of.contains_key(&key)
    }

    fn check_invariants(&self) -> Result<(), StoreError> {
        let n = self.values.len();
        if self.slot_of.len() != n || self.id_at.len() != n || self.parent_of.len() != n {
            return Err(StoreError::Corrupted(format!(
                "size mismatch: values={n} id->slot={} slot->id={} parents={}",
                self.slot_of.len(),
                self.id_at.len(),
                self.parent_of.len()
            )));
        }
        for (slot, id) in self.id_at.iter().enumerate() {
            if self.slot_of.get(id) != Some(&slot) {
                return Err(StoreError::Corrupted(format!("{id} does not map back to slot {slot}")));
            }
        }
        let listed: usize = self.children.values().map(Vec::len).sum();
        if listed != n {
            return Err(StoreError::Corrupted(format!("child lists hold {listed} entries, expected {n}")));
        }
        for (parent, list) in &self.children {
            for child in list {
                if self.parent_of.get(child) != Some(parent) {
                    return Err(StoreError::Corrupted(format!("{child} listed under {parent} but owned elsewhere")));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_keep_order() {
        let mut store = ManyStore::new();
        let p = Id::next();
        let a = store.add(p, 1);
        let b = store.add(p, 2);
        let c = store.add(p, 3);
        assert_eq!(store.children(p), &[a, b, c]);

        store.remove(b).unwrap();
        assert_eq!(store.children(p), &[a, c]);
        assert_eq!(*store.get(c).unwrap(), 3);
        store.check_invariants().unwrap();
    }

    #[test]
    fn cascade_leaves_other_parents_alone() {
        let mut store = ManyStore::new();
        let p = Id::next();
        let q = Id::next();
        store.add(p, "p1");
        let q1 = store.add(q, "q1");
        store.add(p, "p2");
        let q2 = store.add(q, "q2");

        assert_eq!(store.remove_children(p).unwrap(), 2);
        assert!(store.children(p).is_empty());
        assert_eq!(store.len(), 2);
        assert_eq!(*store.get(q1).unwrap(), "q1");
        assert_eq!(*store.get(q2).unwrap(), "q2");
        assert_eq!(store.parent(q2), Some(q));
        store.check_invariants().unwrap();
    }

    #[test]
    fn insert_existing_child_moves_parent() {
        let mut store = ManyStore::new();
        let p = Id::next();
        let q = Id::next();
        let child = store.add(p, 'x');
        store.insert(q, child, 'y');

        assert!(store.children(p).is_empty());
        assert_eq!(store.children(q), &[child]);
        assert_eq!(*store.get(child).unwrap(), 'y');
        store.check_invariants().unwrap();
    }

    #[test]
    fn remove_children_of_unknown_parent_is_noop() {
        let mut store: ManyStore<u8> = ManyStore::new();
        assert_eq!(store.remove_children(Id::next()).unwrap(), 0);
    }

    #[test]
    fn stale_child_listing_is_reported() {
        let mut store = ManyStore::new();
        let p = Id::next();
        store.add(p, 1);
        let ghost = Id::next();
        store.children.entry(p).or_default().push(ghost);

        let err = store.remove_children(p).unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound(_)));
        assert!(store.check_invariants().is_err());
    }
}
