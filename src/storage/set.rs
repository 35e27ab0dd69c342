//! Ordered set of live identifiers of one entity kind.

use crate::id::Id;

/// Insertion-ordered identifier list.
///
/// Order only matters for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet {
    ids: Vec<Id>,
}

impl IdSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless it is already present.
    pub fn add(&mut self, id: Id) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Removes `id`, returning whether it was present.
    pub fn remove(&mut self, id: Id) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| *x != id);
        self.ids.len() != before
    }

    /// True if `id` is present.
    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    /// Number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if the set holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Id] {
        &self.ids
    }

    /// Iterate in order.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_across_removal() {
        let mut set = IdSet::new();
        let ids: Vec<Id> = (0..4).map(|_| Id::next()).collect();
        for id in &ids {
            set.add(*id);
        }
        set.add(ids[0]);
        assert_eq!(set.len(), 4);

        assert!(set.remove(ids[1]));
        assert!(!set.remove(ids[1]));
        assert_eq!(set.as_slice(), &[ids[0], ids[2], ids[3]]);
    }
}
