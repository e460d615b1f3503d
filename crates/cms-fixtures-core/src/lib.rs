//! CMS Fixtures Core - entity fixtures for behavior-driven CMS tests
//!
//! A [`FixtureManager`] turns tabular fixture rows into CMS entities through
//! an injected [`StorageProvider`], resolves file and entity references in
//! their fields, tracks everything it creates during a scenario and deletes
//! it again when the scenario ends.

#![forbid(unsafe_code)]

/// Error types
pub mod error;

/// Entity, field and reference model
pub mod types;

/// Storage capability traits and the standard registry
pub mod storage;

/// Tabular input and nested column expansion
pub mod rows;

/// Reference resolution
pub mod resolve;

/// Configuration
pub mod config;

/// The per-scenario fixture manager
pub mod manager;

/// In-memory storage backend
#[cfg(feature = "testing")]
pub mod memory;

pub use config::FixtureConfig;
pub use error::{FixtureError, FixtureResult, StorageError, StorageResult};
pub use manager::{ChildFixture, CleanupOutcome, CleanupSummary, FixtureManager};
pub use rows::{expand_columns, row_from_rows_hash, rows_from_table, FixtureRow};
pub use storage::{EntityStorage, StorageProvider, StorageRegistry};
pub use types::{
    Entity, EntityId, EntityKeys, EntityKind, EntityRef, FieldDefinition, FieldKind, FieldSpec,
    FieldValue, Fields,
};
