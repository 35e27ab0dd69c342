//! Shared contract for the indexed stores.
//!
//! All stores keep their values in a dense array and translate keys to slots
//! through a pair of maps. Slot positions are an implementation detail of
//! compaction and never leave the store.

use std::fmt;

use thiserror::Error;

/// Errors raised by store lookups.
///
/// A missing key is always a caller bug: the engine never queries an
/// identifier it has already removed within the same pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No slot for the given key.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The translation maps disagree with the value array.
    #[error("Store corrupted: {0}")]
    Corrupted(String),
}

impl StoreError {
    pub(crate) fn missing(key: impl fmt::Display) -> Self {
        Self::KeyNotFound(key.to_string())
    }
}

/// Operations common to every indexed store.
pub trait IndexedStore {
    /// Key type (an identifier or a pair of identifiers).
    type Key: Copy;

    /// Number of stored values.
    fn len(&self) -> usize;

    /// True if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `key` currently owns a slot.
    fn contains(&self, key: Self::Key) -> bool;

    /// Verifies that the slot maps are exact inverses of each other and match
    /// the value array.
    ///
    /// # Errors
    /// Returns `StoreError::Corrupted` describing the first mismatch.
    fn check_invariants(&self) -> Result<(), StoreError>;
}
