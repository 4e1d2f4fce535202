use std::collections::HashMap;
use std::sync::Arc;

use super::row::{Row, build_column_index};
use crate::types::Value;

/// Every row returned by a raw read, plus the column names they share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub rows: Vec<Row>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_columns(column_names: Vec<String>) -> Self {
        let column_index = build_column_index(&column_names);
        Self {
            rows: Vec::new(),
            column_names: Arc::new(column_names),
            column_index,
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn add_row_values(&mut self, values: Vec<Value>) {
        self.rows.push(self.make_row(values));
    }

    pub(crate) fn make_row(&self, values: Vec<Value>) -> Row {
        Row::new(
            Arc::clone(&self.column_names),
            Arc::clone(&self.column_index),
            values,
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of every row.
    #[must_use]
    pub fn first_column(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get_by_index(0).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
