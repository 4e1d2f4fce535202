use super::row::Row;
use crate::types::Value;

/// Result of a structured get.
///
/// `get` (first mode) yields `NoRow`, `Row` or, when exactly one named column
/// was requested, `Value`. `get_all` yields `Rows`, or `Values` for a single
/// named column.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    NoRow,
    Row(Row),
    Value(Value),
    Rows(Vec<Row>),
    Values(Vec<Value>),
}

impl Fetched {
    #[must_use]
    pub fn is_no_row(&self) -> bool {
        matches!(self, Fetched::NoRow)
    }

    /// The single scalar of a first-mode single-column get, `None` when no row matched.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Fetched::Value(value) => Some(value),
            Fetched::Row(row) => Some(row.into_first()),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_row(self) -> Option<Row> {
        match self {
            Fetched::Row(row) => Some(row),
            Fetched::Rows(rows) => rows.into_iter().next(),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Fetched::Rows(rows) => rows,
            Fetched::Row(row) => vec![row],
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Fetched::Values(values) => values,
            Fetched::Value(value) => vec![value],
            Fetched::Rows(rows) => rows.into_iter().map(Row::into_first).collect(),
            Fetched::Row(row) => vec![row.into_first()],
            Fetched::NoRow => Vec::new(),
        }
    }

    /// Number of rows this result stands for.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Fetched::NoRow => 0,
            Fetched::Row(_) | Fetched::Value(_) => 1,
            Fetched::Rows(rows) => rows.len(),
            Fetched::Values(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
