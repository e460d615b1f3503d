//! Per-scenario fixture manager
//!
//! Turns tabular fixture rows into live entities, tracks everything it
//! creates and deletes it all again in [`FixtureManager::cleanup`]. One
//! manager belongs to exactly one scenario.

use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::FixtureConfig;
use crate::error::{FixtureError, FixtureResult};
use crate::resolve::Resolver;
use crate::rows::{expand_columns, FixtureRow};
use crate::storage::StorageProvider;
use crate::types::{Entity, EntityKind, EntityRef, FieldValue, Fields};

/// Length of the generated label for parents created around a child
const GENERATED_LABEL_LEN: usize = 20;

/// Where a child fixture goes: its kind, its type within that kind, and the
/// parent field it is appended to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFixture {
    pub kind: EntityKind,
    pub child_type: String,
    pub field: String,
}

impl ChildFixture {
    pub fn new(
        kind: impl Into<EntityKind>,
        child_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            child_type: child_type.into(),
            field: field.into(),
        }
    }
}

/// Outcome of deleting one kind's tracked entities
#[derive(Debug)]
pub struct CleanupOutcome {
    pub kind: EntityKind,
    pub count: usize,
    pub result: FixtureResult<()>,
}

/// Per-kind results of a cleanup run, in first-tracked order
#[derive(Debug, Default)]
pub struct CleanupSummary {
    pub outcomes: Vec<CleanupOutcome>,
}

impl CleanupSummary {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    /// Number of entities whose kind was deleted successfully
    pub fn deleted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .map(|outcome| outcome.count)
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&EntityKind, &FixtureError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|err| (&outcome.kind, err)))
    }
}

/// Creates fixture entities and guarantees their removal
pub struct FixtureManager {
    provider: Arc<dyn StorageProvider>,
    config: FixtureConfig,
    /// Every entity created this scenario, in creation order
    tracked: Vec<Entity>,
}

impl fmt::Debug for FixtureManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureManager")
            .field("config", &self.config)
            .field("tracked", &self.tracked.len())
            .finish()
    }
}

impl FixtureManager {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self::with_config(provider, FixtureConfig::default())
    }

    pub fn with_config(provider: Arc<dyn StorageProvider>, config: FixtureConfig) -> Self {
        Self {
            provider,
            config,
            tracked: Vec::new(),
        }
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    pub fn tracked_of<'a>(&'a self, kind: &'a EntityKind) -> impl Iterator<Item = &'a Entity> {
        self.tracked.iter().filter(move |entity| entity.kind == *kind)
    }

    /// The `index`-th entity of `kind` created this scenario
    pub fn tracked_entity(&self, kind: &EntityKind, index: usize) -> FixtureResult<&Entity> {
        self.tracked_position(kind, index)
            .map(|position| &self.tracked[position])
            .ok_or_else(|| not_tracked(kind, index))
    }

    fn tracked_position(&self, kind: &EntityKind, index: usize) -> Option<usize> {
        self.tracked
            .iter()
            .enumerate()
            .filter(|(_, entity)| entity.kind == *kind)
            .nth(index)
            .map(|(position, _)| position)
    }

    /// Create one entity per row. The first failing row aborts the batch;
    /// rows created before it stay tracked.
    pub async fn create_entities(
        &mut self,
        kind: &EntityKind,
        rows: &[FixtureRow],
    ) -> FixtureResult<Vec<EntityRef>> {
        let mut created = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let entity = self.create_entity(kind, row).await.map_err(|err| {
                warn!(
                    kind = %kind,
                    row = row_index,
                    error = %err,
                    "Fixture row failed, aborting batch"
                );
                err
            })?;
            created.extend(entity.entity_ref());
        }

        info!(kind = %kind, count = created.len(), "Created fixture entities");
        Ok(created)
    }

    /// Single-row path: expand, resolve references, persist and track
    pub async fn create_entity(
        &mut self,
        kind: &EntityKind,
        row: &FixtureRow,
    ) -> FixtureResult<Entity> {
        let expanded = expand_columns(row, self.config.column_delimiter)?;
        let fields = Resolver::new(self.provider.as_ref(), &self.config)
            .resolve_fields(kind, expanded)
            .await?;
        self.persist(kind, fields).await
    }

    async fn persist(&mut self, kind: &EntityKind, fields: Fields) -> FixtureResult<Entity> {
        let storage = self.provider.storage(kind)?;
        let mut entity = storage
            .create(fields)
            .await
            .map_err(FixtureError::persistence(kind, "create"))?;
        storage
            .save(&mut entity)
            .await
            .map_err(FixtureError::persistence(kind, "save"))?;

        debug!(kind = %kind, id = ?entity.id, "Tracking fixture entity");
        self.tracked.push(entity.clone());
        Ok(entity)
    }

    /// Create menu links from rows with `title` and `url` columns
    pub async fn create_menu_items(
        &mut self,
        menu_name: &str,
        rows: &[FixtureRow],
    ) -> FixtureResult<Vec<EntityRef>> {
        let kind = EntityKind::new(self.config.menu_link_kind.clone());
        let mut created = Vec::with_capacity(rows.len());

        for row in rows {
            let title = required_column(row, "title")?;
            let url = required_column(row, "url")?;

            let mut fields = Fields::new();
            fields.insert("title".to_string(), FieldValue::from(title));
            let uri = format!("{}{}", self.config.menu_link_uri_prefix, url);
            fields.insert("link".to_string(), FieldValue::Plain(json!({ "uri": uri })));
            fields.insert("menu_name".to_string(), FieldValue::from(menu_name));
            fields.insert("expanded".to_string(), FieldValue::Plain(Value::Bool(true)));

            let entity = self.persist(&kind, fields).await?;
            created.extend(entity.entity_ref());
        }

        info!(menu = menu_name, count = created.len(), "Created menu items");
        Ok(created)
    }

    /// Attach a new child to the `parent_index`-th tracked entity of
    /// `parent_kind`, appending it to the child's field on the parent.
    pub async fn create_nested_fixture(
        &mut self,
        parent_kind: &EntityKind,
        parent_index: usize,
        child: &ChildFixture,
        row: &FixtureRow,
    ) -> FixtureResult<Entity> {
        let position = self
            .tracked_position(parent_kind, parent_index)
            .ok_or_else(|| not_tracked(parent_kind, parent_index))?;
        self.ensure_child_type(child).await?;
        self.ensure_field(parent_kind, &child.field).await?;

        let child_ref = self.create_child(child, row).await?;

        let mut parent = self.tracked[position].clone();
        parent.append(&child.field, FieldValue::Reference(child_ref));
        self.provider
            .storage(parent_kind)?
            .save(&mut parent)
            .await
            .map_err(FixtureError::persistence(parent_kind, "save"))?;

        debug!(
            kind = %parent_kind,
            index = parent_index,
            field = %child.field,
            "Appended child fixture"
        );
        self.tracked[position] = parent.clone();
        Ok(parent)
    }

    /// Create a `bundle` entity of `kind` with a generated label whose
    /// `child.field` holds a single new child.
    pub async fn create_entity_with_child(
        &mut self,
        kind: &EntityKind,
        bundle: &str,
        child: &ChildFixture,
        row: &FixtureRow,
    ) -> FixtureResult<Entity> {
        self.ensure_child_type(child).await?;
        self.ensure_field(kind, &child.field).await?;

        let keys = self
            .provider
            .storage(kind)?
            .entity_keys()
            .await
            .map_err(FixtureError::persistence(kind, "entity key lookup"))?;
        let (bundle_key, label_key) = match (keys.bundle, keys.label) {
            (Some(bundle_key), Some(label_key)) => (bundle_key, label_key),
            _ => {
                return Err(FixtureError::InvalidFixture(format!(
                    "{} needs both a bundle and a label key",
                    kind
                )))
            }
        };

        let child_ref = self.create_child(child, row).await?;

        let mut fields = Fields::new();
        fields.insert(bundle_key, FieldValue::from(bundle));
        fields.insert(label_key, FieldValue::from(generated_label().as_str()));
        fields.insert(
            child.field.clone(),
            FieldValue::List(vec![FieldValue::Reference(child_ref)]),
        );
        self.persist(kind, fields).await
    }

    async fn create_child(
        &mut self,
        child: &ChildFixture,
        row: &FixtureRow,
    ) -> FixtureResult<EntityRef> {
        let keys = self
            .provider
            .storage(&child.kind)?
            .entity_keys()
            .await
            .map_err(FixtureError::persistence(&child.kind, "entity key lookup"))?;
        let bundle_key = keys.bundle.ok_or_else(|| {
            FixtureError::InvalidFixture(format!("{} has no bundle key", child.kind))
        })?;

        let mut child_row = row.clone();
        child_row.insert(bundle_key, child.child_type.clone());

        let entity = self.create_entity(&child.kind, &child_row).await?;
        entity.entity_ref().ok_or_else(|| {
            FixtureError::NotFound(format!("Saved {} has no identity", child.kind))
        })
    }

    async fn ensure_child_type(&self, child: &ChildFixture) -> FixtureResult<()> {
        let known = self
            .provider
            .storage(&child.kind)?
            .has_bundle(&child.child_type)
            .await
            .map_err(FixtureError::persistence(&child.kind, "type lookup"))?;
        if known {
            Ok(())
        } else {
            Err(FixtureError::UnknownChildType {
                kind: child.kind.clone(),
                child_type: child.child_type.clone(),
            })
        }
    }

    async fn ensure_field(&self, kind: &EntityKind, field: &str) -> FixtureResult<()> {
        let definitions = self
            .provider
            .storage(kind)?
            .field_definitions()
            .await
            .map_err(FixtureError::persistence(kind, "field definition lookup"))?;
        if definitions.contains_key(field) {
            Ok(())
        } else {
            Err(FixtureError::MissingField {
                kind: kind.clone(),
                field: field.to_string(),
            })
        }
    }

    /// Delete every tracked entity, one batch per kind.
    ///
    /// A failing kind is logged and reported in the summary; the remaining
    /// kinds are still deleted and the tracked set is always emptied.
    pub async fn cleanup(&mut self) -> CleanupSummary {
        let mut groups: Vec<(EntityKind, Vec<Entity>)> = Vec::new();
        for entity in std::mem::take(&mut self.tracked) {
            match groups.iter_mut().find(|(kind, _)| *kind == entity.kind) {
                Some((_, group)) => group.push(entity),
                None => groups.push((entity.kind.clone(), vec![entity])),
            }
        }

        let mut summary = CleanupSummary::default();
        for (kind, entities) in groups {
            let result = self.delete_group(&kind, &entities).await;
            if let Err(err) = &result {
                warn!(
                    kind = %kind,
                    count = entities.len(),
                    error = %err,
                    "Failed to delete fixture entities"
                );
            }
            summary.outcomes.push(CleanupOutcome {
                kind,
                count: entities.len(),
                result,
            });
        }

        if !summary.is_empty() {
            info!(
                deleted = summary.deleted(),
                failed_kinds = summary.failures().count(),
                "Fixture cleanup finished"
            );
        }
        summary
    }

    async fn delete_group(&self, kind: &EntityKind, entities: &[Entity]) -> FixtureResult<()> {
        self.provider
            .storage(kind)?
            .delete(entities)
            .await
            .map_err(FixtureError::persistence(kind, "delete"))
    }
}

fn not_tracked(kind: &EntityKind, index: usize) -> FixtureError {
    FixtureError::NotFound(format!("No {} created for index {}", kind, index))
}

fn required_column<'a>(row: &'a FixtureRow, column: &str) -> FixtureResult<&'a str> {
    row.get(column)
        .ok_or_else(|| FixtureError::InvalidFixture(format!("Missing {} column", column)))
}

fn generated_label() -> String {
    let mut label = Uuid::new_v4().simple().to_string();
    label.truncate(GENERATED_LABEL_LEN);
    label
}
