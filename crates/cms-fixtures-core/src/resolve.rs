//! Reference resolution for fixture fields
//!
//! Each field is classified once against its definition into a [`FieldSpec`]
//! and then resolved into a [`FieldValue`]. Structural keys and undeclared
//! fields pass through as plain values.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::config::FixtureConfig;
use crate::error::{FixtureError, FixtureResult};
use crate::storage::StorageProvider;
use crate::types::{
    EntityKeys, EntityKind, FieldDefinition, FieldKind, FieldSpec, FieldValue, Fields,
};

/// Classify one field's raw value by its definition
pub fn classify(
    field: &str,
    value: Value,
    definition: Option<&FieldDefinition>,
) -> FixtureResult<FieldSpec> {
    let kind = match definition {
        Some(definition) => &definition.kind,
        None => return Ok(FieldSpec::Plain(value)),
    };

    match kind {
        FieldKind::Plain => Ok(FieldSpec::Plain(value)),
        FieldKind::FileReference => Ok(FieldSpec::FileReference {
            locator: scalar(field, value)?,
        }),
        FieldKind::EntityReference { target } => Ok(FieldSpec::EntityReference {
            target: target.clone(),
            label: scalar(field, value)?,
        }),
    }
}

fn scalar(field: &str, value: Value) -> FixtureResult<String> {
    match value {
        Value::String(value) => Ok(value),
        other => Err(FixtureError::InvalidFixture(format!(
            "Reference field {} expects a single value, got {}",
            field, other
        ))),
    }
}

/// Resolves classified fields against storage
pub struct Resolver<'a> {
    provider: &'a dyn StorageProvider,
    config: &'a FixtureConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(provider: &'a dyn StorageProvider, config: &'a FixtureConfig) -> Self {
        Self { provider, config }
    }

    /// Resolve every field of an expanded row for `kind`
    pub async fn resolve_fields(
        &self,
        kind: &EntityKind,
        fields: Map<String, Value>,
    ) -> FixtureResult<Fields> {
        let storage = self.provider.storage(kind)?;
        let keys = storage
            .entity_keys()
            .await
            .map_err(FixtureError::persistence(kind, "entity key lookup"))?;
        let definitions = storage
            .field_definitions()
            .await
            .map_err(FixtureError::persistence(kind, "field definition lookup"))?;

        let mut resolved = Fields::new();
        for (name, value) in fields {
            let spec = if keys.contains(&name) {
                FieldSpec::Plain(value)
            } else {
                classify(&name, value, definitions.get(&name))?
            };
            let value = self.resolve(spec).await?;
            resolved.insert(name, value);
        }

        Ok(resolved)
    }

    pub async fn resolve(&self, spec: FieldSpec) -> FixtureResult<FieldValue> {
        match spec {
            FieldSpec::Plain(value) => Ok(FieldValue::Plain(value)),
            FieldSpec::FileReference { locator } => {
                let file_kind = EntityKind::new(self.config.file_kind.clone());
                self.load_last(&file_kind, &self.config.file_locator_key, &locator)
                    .await
            }
            FieldSpec::EntityReference { target, label } => {
                let keys: EntityKeys = self
                    .provider
                    .storage(&target)?
                    .entity_keys()
                    .await
                    .map_err(FixtureError::persistence(&target, "entity key lookup"))?;
                let label_key = keys.label.ok_or_else(|| {
                    FixtureError::InvalidFixture(format!(
                        "{} has no label key to resolve references by",
                        target
                    ))
                })?;
                self.load_last(&target, &label_key, &label).await
            }
        }
    }

    /// Last-loaded entity of `kind` whose `key` equals `value`; ties are not an error
    async fn load_last(
        &self,
        kind: &EntityKind,
        key: &str,
        value: &str,
    ) -> FixtureResult<FieldValue> {
        let storage = self.provider.storage(kind)?;
        let properties = HashMap::from([(key.to_string(), value.to_string())]);
        let matches = storage
            .load_by_properties(&properties)
            .await
            .map_err(FixtureError::persistence(kind, "lookup"))?;

        if matches.len() > 1 {
            debug!(
                kind = %kind,
                key,
                value,
                count = matches.len(),
                "Ambiguous reference, using the last match"
            );
        }

        let reference = matches
            .last()
            .and_then(|entity| entity.entity_ref())
            .ok_or_else(|| FixtureError::ReferenceNotFound {
                target: kind.clone(),
                key: key.to_string(),
                value: value.to_string(),
            })?;

        Ok(FieldValue::Reference(reference))
    }
}
