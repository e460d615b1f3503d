//! Tabular fixture input and nested column expansion

use serde_json::{Map, Value};

use crate::error::{FixtureError, FixtureResult};

/// One row of a fixture table: column header to raw cell value, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureRow(Vec<(String, String)>);

impl FixtureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column, replacing an earlier cell with the same header
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FixtureRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = FixtureRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Rows of a horizontal table whose first row holds the column headers
pub fn rows_from_table(table: &[Vec<String>]) -> FixtureResult<Vec<FixtureRow>> {
    let (headers, body) = table.split_first().ok_or_else(|| {
        FixtureError::InvalidFixture("Fixture table has no header row".to_string())
    })?;

    body.iter()
        .enumerate()
        .map(|(index, cells)| {
            if cells.len() != headers.len() {
                return Err(FixtureError::InvalidFixture(format!(
                    "Row {} has {} cells but the header has {}",
                    index + 1,
                    cells.len(),
                    headers.len()
                )));
            }
            Ok(headers.iter().cloned().zip(cells.iter().cloned()).collect())
        })
        .collect()
}

/// A single row from a vertical `| key | value |` table
pub fn row_from_rows_hash(table: &[Vec<String>]) -> FixtureResult<FixtureRow> {
    table
        .iter()
        .map(|cells| match cells.as_slice() {
            [key, value] => Ok((key.clone(), value.clone())),
            _ => Err(FixtureError::InvalidFixture(format!(
                "Expected a key and a value per row, got {} cells",
                cells.len()
            ))),
        })
        .collect()
}

/// Expand `field:column` headers into nested objects, at every depth.
///
/// `a:b:c = v` becomes `{a: {b: {c: v}}}`. A header that is both a scalar and
/// a nested prefix is rejected, so `| image | image:alt |` is `InvalidFixture`
/// rather than a resolved reference with an extra column.
pub fn expand_columns(row: &FixtureRow, delimiter: char) -> FixtureResult<Map<String, Value>> {
    let flat = row
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();
    expand_map(flat, delimiter)
}

fn expand_map(fields: Map<String, Value>, delimiter: char) -> FixtureResult<Map<String, Value>> {
    let mut expanded = Map::new();

    for (name, value) in fields {
        let (field, column) = match name.split_once(delimiter) {
            Some((field, column)) => {
                if field.is_empty() || column.is_empty() {
                    return Err(FixtureError::InvalidFixture(format!(
                        "Malformed column name: {}",
                        name
                    )));
                }
                (field.to_string(), Some(column.to_string()))
            }
            None => (name, None),
        };

        match column {
            Some(column) => {
                let entry = expanded
                    .entry(field.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                match entry {
                    Value::Object(columns) => {
                        columns.insert(column, value);
                    }
                    _ => return Err(conflict(&field)),
                }
            }
            None => {
                if expanded.contains_key(&field) {
                    return Err(conflict(&field));
                }
                expanded.insert(field, value);
            }
        }
    }

    expanded
        .into_iter()
        .map(|(name, value)| match value {
            Value::Object(nested) => Ok((name, Value::Object(expand_map(nested, delimiter)?))),
            scalar => Ok((name, scalar)),
        })
        .collect()
}

fn conflict(field: &str) -> FixtureError {
    FixtureError::InvalidFixture(format!(
        "Field {} is given both as a value and as nested columns",
        field
    ))
}
