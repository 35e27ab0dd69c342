//! Process-unique identifiers.
//!
//! Every editable entity is referenced from the outside by an [`Id`] and never
//! by its position inside a store. Stores compact with swap-remove, so slots
//! move around; identifiers do not, and they are never handed out twice.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, totally ordered entity identifier.
///
/// # Examples
///
/// ```
/// use cellforge::Id;
///
/// let a = Id::next();
/// let b = Id::next();
/// assert!(a < b);
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(u64);

impl Id {
    /// Issues a fresh identifier.
    ///
    /// Monotonically increasing for the lifetime of the process. Deleting an
    /// entity does not return its identifier to the pool.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let ids: Vec<Id> = (0..64).map(|_| Id::next()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn display_is_prefixed() {
        let id = Id::next();
        assert_eq!(id.to_string(), format!("#{}", id.as_u64()));
    }
}
