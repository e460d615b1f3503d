//! Entity storage wrapper that can simulate backend failures

use anyhow::anyhow;
use async_trait::async_trait;
use cms_fixtures_core::{
    Entity, EntityKeys, EntityStorage, FieldDefinition, Fields, StorageError, StorageResult,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Delegates to an inner storage unless a failure mode is switched on
pub struct FailableEntityStorage {
    inner: Arc<dyn EntityStorage>,
    should_fail_create: AtomicBool,
    should_fail_save: AtomicBool,
    should_fail_delete: AtomicBool,
    should_fail_lookup: AtomicBool,
    delete_calls: AtomicUsize,
    save_calls: AtomicUsize,
}

impl FailableEntityStorage {
    pub fn new(inner: Arc<dyn EntityStorage>) -> Self {
        Self {
            inner,
            should_fail_create: AtomicBool::new(false),
            should_fail_save: AtomicBool::new(false),
            should_fail_delete: AtomicBool::new(false),
            should_fail_lookup: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_should_fail_create(&self, should_fail: bool) {
        self.should_fail_create.store(should_fail, Ordering::SeqCst);
    }

    pub fn set_should_fail_save(&self, should_fail: bool) {
        self.should_fail_save.store(should_fail, Ordering::SeqCst);
    }

    pub fn set_should_fail_delete(&self, should_fail: bool) {
        self.should_fail_delete.store(should_fail, Ordering::SeqCst);
    }

    pub fn set_should_fail_lookup(&self, should_fail: bool) {
        self.should_fail_lookup.store(should_fail, Ordering::SeqCst);
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, operation: &str) -> StorageResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable(format!("simulated {} failure", operation)))
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for FailableEntityStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailableEntityStorage")
            .field("should_fail_create", &self.should_fail_create)
            .field("should_fail_save", &self.should_fail_save)
            .field("should_fail_delete", &self.should_fail_delete)
            .field("should_fail_lookup", &self.should_fail_lookup)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EntityStorage for FailableEntityStorage {
    async fn create(&self, fields: Fields) -> StorageResult<Entity> {
        Self::check(&self.should_fail_create, "create")?;
        self.inner.create(fields).await
    }

    async fn save(&self, entity: &mut Entity) -> StorageResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.should_fail_save, "save")?;
        self.inner.save(entity).await
    }

    async fn delete(&self, entities: &[Entity]) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.should_fail_delete, "delete")?;
        self.inner.delete(entities).await
    }

    async fn load_by_properties(
        &self,
        properties: &HashMap<String, String>,
    ) -> StorageResult<Vec<Entity>> {
        if self.should_fail_lookup.load(Ordering::SeqCst) {
            return Err(StorageError::Backend(anyhow!("simulated lookup failure")));
        }
        self.inner.load_by_properties(properties).await
    }

    async fn field_definitions(&self) -> StorageResult<HashMap<String, FieldDefinition>> {
        self.inner.field_definitions().await
    }

    async fn entity_keys(&self) -> StorageResult<EntityKeys> {
        self.inner.entity_keys().await
    }

    async fn has_bundle(&self, bundle: &str) -> StorageResult<bool> {
        self.inner.has_bundle(bundle).await
    }
}
