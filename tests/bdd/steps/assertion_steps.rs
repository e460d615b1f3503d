use cms_fixtures_core::{Entity, EntityKind, FieldValue};
use cucumber::then;

use crate::steps::world::FixtureWorld;

fn references_in(entity: &Entity, field: &str) -> usize {
    entity.get(field).map_or(0, |value| value.references().len())
}

#[then(expr = "{int} {word} entity/entities should be tracked")]
async fn tracked_count(world: &mut FixtureWorld, expected: usize, kind: String) {
    let kind = EntityKind::from(kind);
    assert_eq!(world.manager.tracked_of(&kind).count(), expected);
}

#[then(expr = "{int} {word} entity/entities should be stored")]
async fn stored_count(world: &mut FixtureWorld, expected: usize, kind: String) {
    let storage = world
        .model
        .storage(&kind)
        .unwrap_or_else(|| panic!("No storage for entity kind {}", kind));
    assert_eq!(storage.count().await, expected);
}

#[then("nothing should be tracked")]
async fn nothing_tracked(world: &mut FixtureWorld) {
    assert_eq!(world.manager.tracked_count(), 0);
}

#[then(expr = "{word} {int} should have {string} set to {string}")]
async fn field_set_to(
    world: &mut FixtureWorld,
    kind: String,
    index: usize,
    field: String,
    expected: String,
) {
    let entity = world.tracked(&kind, index);
    assert_eq!(
        entity.get_str(&field),
        Some(expected.as_str()),
        "{} {} has {:?} in {}",
        kind,
        index,
        entity.get(&field),
        field
    );
}

#[then(expr = "{word} {int} should have {string} with {string} set to {string}")]
async fn column_set_to(
    world: &mut FixtureWorld,
    kind: String,
    index: usize,
    field: String,
    column: String,
    expected: String,
) {
    let entity = world.tracked(&kind, index);
    let actual = match entity.get(&field) {
        Some(FieldValue::Plain(value)) => value.get(&column).and_then(|v| v.as_str()),
        _ => None,
    };
    assert_eq!(actual, Some(expected.as_str()));
}

#[then(expr = "the {word} of {word} {int} should reference the {word} with {word} {string}")]
async fn field_references(
    world: &mut FixtureWorld,
    field: String,
    kind: String,
    index: usize,
    target: String,
    key: String,
    expected: String,
) {
    let references: Vec<_> = world
        .tracked(&kind, index)
        .get(&field)
        .map(|value| value.references().into_iter().cloned().collect())
        .unwrap_or_default();
    let storage = world
        .model
        .storage(&target)
        .unwrap_or_else(|| panic!("No storage for entity kind {}", target));

    let mut found = Vec::new();
    for reference in references.iter().filter(|r| r.kind.as_str() == target) {
        if let Some(entity) = storage.get(&reference.id).await {
            found.push(entity.get_str(&key).map(str::to_string));
        }
    }
    assert!(
        found.iter().any(|value| value.as_deref() == Some(expected.as_str())),
        "{} of {} {} references {:?}",
        field,
        kind,
        index,
        found
    );
}

#[then(expr = "{word} {int} should have {int} paragraph(s) in {word}")]
async fn paragraphs_in(
    world: &mut FixtureWorld,
    kind: String,
    index: usize,
    expected: usize,
    field: String,
) {
    assert_eq!(references_in(world.tracked(&kind, index), &field), expected);
}

#[then(expr = "the viewed {word} should have {int} paragraph(s) in {word}")]
async fn viewed_paragraphs_in(
    world: &mut FixtureWorld,
    kind: String,
    expected: usize,
    field: String,
) {
    let entity = world.viewing.as_ref().expect("Nothing is being viewed");
    assert_eq!(entity.kind.as_str(), kind);
    assert_eq!(references_in(entity, &field), expected);
}

#[then(expr = "the viewed {word} should have a generated {word}")]
async fn viewed_generated_label(world: &mut FixtureWorld, kind: String, label_key: String) {
    let entity = world.viewing.as_ref().expect("Nothing is being viewed");
    assert_eq!(entity.kind.as_str(), kind);
    let label = entity.get_str(&label_key).unwrap_or_default();
    assert_eq!(label.len(), 20);
    assert!(label.chars().all(|c| c.is_ascii_hexdigit()), "label {:?}", label);
}

#[then(expr = "I should be viewing the {word} with {string} set to {string}")]
async fn viewing_entity_with(
    world: &mut FixtureWorld,
    kind: String,
    field: String,
    expected: String,
) {
    let entity = world.viewing.as_ref().expect("Nothing is being viewed");
    assert_eq!(entity.kind.as_str(), kind);
    assert_eq!(entity.get_str(&field), Some(expected.as_str()));
}

#[then("nothing should be viewed")]
async fn nothing_viewed(world: &mut FixtureWorld) {
    assert!(world.viewing.is_none());
}

#[then(expr = "the step should fail with {string}")]
async fn step_failed_with(world: &mut FixtureWorld, expected: String) {
    let err = world
        .last_error
        .take()
        .expect("The step was expected to fail but succeeded");
    let message = err.to_string();
    assert!(
        message.contains(&expected),
        "expected error containing {:?}, got {:?}",
        expected,
        message
    );
}

#[then(expr = "the cleanup should report a failure for {word}")]
async fn cleanup_failure_for(world: &mut FixtureWorld, kind: String) {
    let summary = world.last_cleanup.as_ref().expect("Cleanup has not run");
    assert!(
        summary.failures().any(|(failed, _)| failed.as_str() == kind),
        "no cleanup failure for {}: {:?}",
        kind,
        summary
    );
}

#[then("the cleanup should succeed")]
async fn cleanup_succeeded(world: &mut FixtureWorld) {
    let summary = world.last_cleanup.as_ref().expect("Cleanup has not run");
    assert!(summary.is_clean(), "{:?}", summary);
}

#[then(expr = "the cleanup should delete {int} entities")]
async fn cleanup_deleted(world: &mut FixtureWorld, expected: usize) {
    let summary = world.last_cleanup.as_ref().expect("Cleanup has not run");
    assert_eq!(summary.deleted(), expected);
}
