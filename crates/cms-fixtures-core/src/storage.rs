//! Storage capability consumed by the fixture manager
//!
//! The CMS is reached only through these traits. A [`StorageProvider`] is
//! injected into the manager at construction and hands out one
//! [`EntityStorage`] handle per entity kind.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{FixtureError, FixtureResult, StorageResult};
use crate::types::{Entity, EntityKeys, EntityKind, FieldDefinition, Fields};

/// Storage for a single entity kind
#[async_trait]
pub trait EntityStorage: Send + Sync {
    /// Build a new, unsaved entity from resolved field values
    async fn create(&self, fields: Fields) -> StorageResult<Entity>;

    /// Persist an entity; assigns its identity on first save
    async fn save(&self, entity: &mut Entity) -> StorageResult<()>;

    /// Delete a batch of entities of this kind
    async fn delete(&self, entities: &[Entity]) -> StorageResult<()>;

    /// Entities whose plain fields equal every given property, in load order
    async fn load_by_properties(
        &self,
        properties: &HashMap<String, String>,
    ) -> StorageResult<Vec<Entity>>;

    /// Field name to definition for this kind
    async fn field_definitions(&self) -> StorageResult<HashMap<String, FieldDefinition>>;

    /// Structural key names for this kind
    async fn entity_keys(&self) -> StorageResult<EntityKeys>;

    /// Whether `bundle` is a registered type of this kind
    async fn has_bundle(&self, bundle: &str) -> StorageResult<bool>;
}

/// Hands out storage handles by entity kind
pub trait StorageProvider: Send + Sync {
    fn storage(&self, kind: &EntityKind) -> FixtureResult<Arc<dyn EntityStorage>>;
}

/// A fixed map of kind to storage handle
#[derive(Clone, Default)]
pub struct StorageRegistry {
    storages: HashMap<EntityKind, Arc<dyn EntityStorage>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: impl Into<EntityKind>, storage: Arc<dyn EntityStorage>) {
        self.storages.insert(kind.into(), storage);
    }

    pub fn with_storage(
        mut self,
        kind: impl Into<EntityKind>,
        storage: Arc<dyn EntityStorage>,
    ) -> Self {
        self.register(kind, storage);
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EntityKind> {
        self.storages.keys()
    }
}

impl std::fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.storages.keys().map(EntityKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("StorageRegistry").field("kinds", &kinds).finish()
    }
}

impl StorageProvider for StorageRegistry {
    fn storage(&self, kind: &EntityKind) -> FixtureResult<Arc<dyn EntityStorage>> {
        self.storages
            .get(kind)
            .cloned()
            .ok_or_else(|| FixtureError::NotFound(format!("No storage for entity kind {}", kind)))
    }
}
