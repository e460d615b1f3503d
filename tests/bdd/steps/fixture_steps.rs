use cms_fixtures_core::{
    row_from_rows_hash, rows_from_table, EntityKind, FixtureResult, FixtureRow,
};
use cucumber::gherkin::Step;
use cucumber::{given, when};
use tracing::debug;

use crate::steps::world::FixtureWorld;

fn table(step: &Step) -> &[Vec<String>] {
    step.table
        .as_ref()
        .map(|table| table.rows.as_slice())
        .unwrap_or_else(|| panic!("Step \"{}\" needs a data table", step.value))
}

fn fixture_rows(step: &Step) -> Vec<FixtureRow> {
    rows_from_table(table(step)).unwrap_or_else(|err| panic!("{}", err))
}

fn paragraph_row(step: &Step) -> FixtureRow {
    row_from_rows_hash(table(step)).unwrap_or_else(|err| panic!("{}", err))
}

/// Keep the error of a step that is allowed to fail
fn record<T>(world: &mut FixtureWorld, result: FixtureResult<T>) {
    if let Err(err) = result {
        debug!(error = %err, "Step failed as allowed");
        world.last_error = Some(err);
    }
}

// Pre-existing content

#[given(expr = "the file {string} exists")]
async fn file_exists(world: &mut FixtureWorld, uri: String) {
    world.model.seed_file(&uri).await;
}

#[given(expr = "the tag {string} exists")]
async fn tag_exists(world: &mut FixtureWorld, name: String) {
    world.model.seed_term(&name).await;
}

// Backend failures

#[given(expr = "creating {word} entities fails")]
async fn creating_fails(world: &mut FixtureWorld, kind: String) {
    world.failable(&kind).set_should_fail_create(true);
}

#[given(expr = "saving {word} entities fails")]
async fn saving_fails(world: &mut FixtureWorld, kind: String) {
    world.failable(&kind).set_should_fail_save(true);
}

#[given(expr = "deleting {word} entities fails")]
async fn deleting_fails(world: &mut FixtureWorld, kind: String) {
    world.failable(&kind).set_should_fail_delete(true);
}

#[given(expr = "looking up {word} entities fails")]
async fn lookup_fails(world: &mut FixtureWorld, kind: String) {
    world.failable(&kind).set_should_fail_lookup(true);
}

// Entity fixtures

#[given(expr = "{word} entities:")]
async fn entities(world: &mut FixtureWorld, step: &Step, kind: String) {
    let rows = fixture_rows(step);
    world
        .manager
        .create_entities(&EntityKind::from(kind), &rows)
        .await
        .unwrap_or_else(|err| panic!("{}", err));
}

#[when(expr = "I try to create {word} entities:")]
async fn try_entities(world: &mut FixtureWorld, step: &Step, kind: String) {
    let rows = fixture_rows(step);
    let result = world
        .manager
        .create_entities(&EntityKind::from(kind), &rows)
        .await;
    record(world, result);
}

#[given(expr = "{string} menu items:")]
async fn menu_items(world: &mut FixtureWorld, step: &Step, menu_name: String) {
    let rows = fixture_rows(step);
    world
        .manager
        .create_menu_items(&menu_name, &rows)
        .await
        .unwrap_or_else(|err| panic!("{}", err));
}

#[when(expr = "I try to create {string} menu items:")]
async fn try_menu_items(world: &mut FixtureWorld, step: &Step, menu_name: String) {
    let rows = fixture_rows(step);
    let result = world.manager.create_menu_items(&menu_name, &rows).await;
    record(world, result);
}

// Paragraph fixtures

#[given(expr = "a {word} paragraph on {word} of {word} {int}:")]
async fn paragraph_on_entity(
    world: &mut FixtureWorld,
    step: &Step,
    paragraph_type: String,
    field: String,
    kind: String,
    index: usize,
) {
    let child = world.child(paragraph_type, field);
    let row = paragraph_row(step);
    world
        .manager
        .create_nested_fixture(&EntityKind::from(kind), index, &child, &row)
        .await
        .unwrap_or_else(|err| panic!("{}", err));
}

#[when(expr = "I try to add a {word} paragraph on {word} of {word} {int}:")]
async fn try_paragraph_on_entity(
    world: &mut FixtureWorld,
    step: &Step,
    paragraph_type: String,
    field: String,
    kind: String,
    index: usize,
) {
    let child = world.child(paragraph_type, field);
    let row = paragraph_row(step);
    let result = world
        .manager
        .create_nested_fixture(&EntityKind::from(kind), index, &child, &row)
        .await;
    record(world, result);
}

#[when(expr = "I am viewing a {word} {word} with {word} paragraph in {word}:")]
async fn viewing_entity_with_paragraph(
    world: &mut FixtureWorld,
    step: &Step,
    bundle: String,
    kind: String,
    paragraph_type: String,
    field: String,
) {
    let child = world.child(paragraph_type, field);
    let row = paragraph_row(step);
    let result = world
        .manager
        .create_entity_with_child(&EntityKind::from(kind), &bundle, &child, &row)
        .await;
    match result {
        Ok(entity) => world.viewing = Some(entity),
        Err(err) => world.last_error = Some(err),
    }
}

#[when(expr = "I am viewing {word} {int}")]
async fn viewing_entity(world: &mut FixtureWorld, kind: String, index: usize) {
    let entity = world.tracked(&kind, index).clone();
    world.viewing = Some(entity);
}

// Teardown

#[when("the scenario cleanup runs")]
async fn cleanup_runs(world: &mut FixtureWorld) {
    world.clean_up().await;
}
