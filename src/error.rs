//! Error types for cellforge.
//!
//! User mistakes (bad expressions, dangling links) never show up here: they
//! are recorded as state plus message on the entity they concern. The types
//! below cover logic defects, I/O and persistence.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::definition::{DefKind, State};
use crate::id::Id;
use crate::storage::StoreError;

/// A broken internal invariant. The current pass stops when one is raised.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("Linked {kind} is in transient state '{state}' during propagation")]
    TransientParentState { kind: DefKind, state: State },

    #[error("Identifier {id} is listed as a live {kind} but has no slot")]
    DanglingId { kind: &'static str, id: Id },

    #[error("Store invariant broken: {0}")]
    Store(#[from] StoreError),
}

/// Errors reading or writing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to serialize document: {0}")]
    Serialize(serde_json::Error),

    #[error("Failed to deserialize document: {0}")]
    Deserialize(serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fingerprint mismatch: stored {stored}, computed {computed}")]
    FingerprintMismatch { stored: String, computed: String },

    #[error("Unsupported document format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Top-level error type for cellforge.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Invariant(InvariantViolation::Store(err))
    }
}

impl CoreError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is an invariant violation.
    #[must_use]
    pub const fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// Returns true if this is a persistence error.
    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    /// Returns true if this is a catalog error.
    #[must_use]
    pub const fn is_catalog(&self) -> bool {
        matches!(self, Self::Catalog(_))
    }
}

/// Result type alias for cellforge operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_becomes_invariant() {
        let err: CoreError = StoreError::KeyNotFound("#7".to_string()).into();
        assert!(err.is_invariant());
        assert!(err.to_string().contains("#7"));
    }

    #[test]
    fn transient_state_message() {
        let err = InvariantViolation::TransientParentState {
            kind: DefKind::Locset,
            state: State::Changed,
        };
        let msg = err.to_string();
        assert!(msg.contains("locset"));
        assert!(msg.contains("changed"));
    }

    #[test]
    fn fingerprint_mismatch_message() {
        let err: CoreError = DocumentError::FingerprintMismatch {
            stored: "aa".to_string(),
            computed: "bb".to_string(),
        }
        .into();
        assert!(err.is_document());
        assert!(!err.is_invariant());
        assert!(err.to_string().contains("aa"));
    }

    #[test]
    fn internal_error() {
        let err = CoreError::internal("unexpected state");
        assert!(!err.is_catalog());
        assert!(err.to_string().contains("unexpected state"));
    }
}
