use thiserror::Error;

use crate::types::EntityKind;

/// Errors raised by an entity storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend refused the operation (validation, constraint, schema)
    #[error("Storage rejected the operation: {0}")]
    Rejected(String),

    /// The backend could not be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Catch-all for backend-specific issues
    #[error("Storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by the fixture manager to the calling step
#[derive(Error, Debug)]
pub enum FixtureError {
    /// A declared file or entity reference could not be resolved
    #[error("No {target} with {key} {value} exists")]
    ReferenceNotFound {
        target: EntityKind,
        key: String,
        value: String,
    },

    /// The storage layer rejected a create, save, delete or lookup
    #[error("Persistence failure during {operation} of {kind}: {source}")]
    PersistenceFailure {
        kind: EntityKind,
        operation: &'static str,
        #[source]
        source: StorageError,
    },

    /// A tracked entity or a storage for a kind does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The child kind does not recognise the requested type
    #[error("Unknown {kind} type: {child_type}")]
    UnknownChildType { kind: EntityKind, child_type: String },

    /// The entity schema does not declare the field
    #[error("{kind} does not have a {field} field")]
    MissingField { kind: EntityKind, field: String },

    /// Tabular input that cannot be turned into an entity
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}

impl FixtureError {
    pub(crate) fn persistence(
        kind: &EntityKind,
        operation: &'static str,
    ) -> impl FnOnce(StorageError) -> FixtureError {
        let kind = kind.clone();
        move |source| FixtureError::PersistenceFailure {
            kind,
            operation,
            source,
        }
    }
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;
