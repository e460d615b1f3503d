//! In-memory implementation of EntityStorage
//!
//! Intended for tests and the BDD runner. Entities live in load order in a
//! vector; identities are assigned from a per-kind counter on first save.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::storage::EntityStorage;
use crate::types::{Entity, EntityId, EntityKeys, EntityKind, FieldDefinition, Fields};

/// In-memory storage for a single entity kind
#[derive(Debug)]
pub struct InMemoryEntityStorage {
    kind: EntityKind,
    keys: EntityKeys,
    definitions: HashMap<String, FieldDefinition>,
    bundles: HashSet<String>,
    entities: RwLock<Vec<Entity>>,
    next_id: AtomicU64,
}

impl InMemoryEntityStorage {
    pub fn new(kind: impl Into<EntityKind>, keys: EntityKeys) -> Self {
        Self {
            kind: kind.into(),
            keys,
            definitions: HashMap::new(),
            bundles: HashSet::new(),
            entities: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.definitions.insert(name.into(), definition);
        self
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundles.insert(bundle.into());
        self
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Store an entity directly, outside any fixture manager
    pub async fn seed(&self, fields: Fields) -> Entity {
        let mut entity = Entity::new(self.kind.clone(), fields);
        entity.id = Some(self.allocate_id());
        self.entities.write().await.push(entity.clone());
        entity
    }

    pub async fn all(&self) -> Vec<Entity> {
        self.entities.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn get(&self, id: &EntityId) -> Option<Entity> {
        self.entities
            .read()
            .await
            .iter()
            .find(|entity| entity.id.as_ref() == Some(id))
            .cloned()
    }

    fn allocate_id(&self) -> EntityId {
        EntityId(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }

    fn matches(&self, entity: &Entity, properties: &HashMap<String, String>) -> bool {
        properties.iter().all(|(key, expected)| {
            if *key == self.keys.id {
                entity.id.as_ref().map(|id| id.0.as_str()) == Some(expected.as_str())
            } else {
                entity.get_str(key) == Some(expected.as_str())
            }
        })
    }
}

#[async_trait]
impl EntityStorage for InMemoryEntityStorage {
    async fn create(&self, fields: Fields) -> StorageResult<Entity> {
        Ok(Entity::new(self.kind.clone(), fields))
    }

    async fn save(&self, entity: &mut Entity) -> StorageResult<()> {
        if entity.kind != self.kind {
            return Err(StorageError::Rejected(format!(
                "Cannot save {} in {} storage",
                entity.kind, self.kind
            )));
        }

        let mut entities = self.entities.write().await;
        match entity.id.clone() {
            None => {
                entity.id = Some(self.allocate_id());
                entities.push(entity.clone());
            }
            Some(id) => {
                let existing = entities
                    .iter_mut()
                    .find(|stored| stored.id.as_ref() == Some(&id))
                    .ok_or_else(|| {
                        StorageError::Rejected(format!("{} {} does not exist", self.kind, id))
                    })?;
                *existing = entity.clone();
            }
        }
        Ok(())
    }

    async fn delete(&self, entities: &[Entity]) -> StorageResult<()> {
        let ids: HashSet<&EntityId> = entities.iter().filter_map(|e| e.id.as_ref()).collect();
        self.entities
            .write()
            .await
            .retain(|stored| stored.id.as_ref().map_or(true, |id| !ids.contains(id)));
        Ok(())
    }

    async fn load_by_properties(
        &self,
        properties: &HashMap<String, String>,
    ) -> StorageResult<Vec<Entity>> {
        Ok(self
            .entities
            .read()
            .await
            .iter()
            .filter(|entity| self.matches(entity, properties))
            .cloned()
            .collect())
    }

    async fn field_definitions(&self) -> StorageResult<HashMap<String, FieldDefinition>> {
        Ok(self.definitions.clone())
    }

    async fn entity_keys(&self) -> StorageResult<EntityKeys> {
        Ok(self.keys.clone())
    }

    async fn has_bundle(&self, bundle: &str) -> StorageResult<bool> {
        Ok(self.bundles.contains(bundle))
    }
}
