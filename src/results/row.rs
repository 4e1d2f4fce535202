use std::collections::HashMap;
use std::sync::Arc;

use crate::types::Value;

/// A single row from a query result
///
/// Column names are shared by every row of the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    column_names: Arc<Vec<String>>,
    values: Vec<Value>,
    column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    pub(crate) fn new(
        column_names: Arc<Vec<String>>,
        column_index: Arc<HashMap<String, usize>>,
        values: Vec<Value>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column name. With duplicate names (joins) the first one wins.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.column_index
            .get(column_name)
            .and_then(|&idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Take the first value, as the single-column simplification does.
    pub(crate) fn into_first(self) -> Value {
        self.values.into_iter().next().unwrap_or(Value::Null)
    }
}

pub(crate) fn build_column_index(names: &[String]) -> Arc<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        index.entry(name.clone()).or_insert(i);
    }
    Arc::new(index)
}
