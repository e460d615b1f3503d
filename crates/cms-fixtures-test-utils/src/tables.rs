use cms_fixtures_core::{rows_from_table, FixtureRow};

/// Build a data table the way a step receives it
pub fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|cells| cells.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Fixture rows from a header row followed by value rows
pub fn fixture_rows(rows: &[&[&str]]) -> Vec<FixtureRow> {
    rows_from_table(&table(rows)).expect("test table should be rectangular")
}
