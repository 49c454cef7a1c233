//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity (trade)
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Duplicate entity (insert of an existing id)
    #[error("Duplicate entity: {entity_type} with id {id}")]
    Duplicate {
        /// Type of entity
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Entity changed since it was read
    #[error("Concurrent modification: {entity_type} with id {id}")]
    Conflict {
        /// Type of entity
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Domain error passthrough
    #[error("Domain error: {0}")]
    Domain(#[from] pipbook_domain::DomainError),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a duplicate error
    pub fn duplicate(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a concurrent modification error
    pub fn conflict(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Conflict {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}
