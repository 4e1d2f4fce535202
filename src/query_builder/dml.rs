use crate::db::Database;
use crate::engine::Completion;
use crate::error::SqliteWrapperError;
use crate::types::{SetValue, Value};

use super::filter::{Filter, Filterable};
use super::sort::{Sort, Sortable};
use super::statement::QueryNode;

/// `INSERT INTO table (cols) VALUES (?, ...)`.
#[derive(Debug, Clone)]
pub struct AddRow<'db> {
    db: &'db Database,
    table: String,
    values: Vec<(String, Value)>,
}

impl<'db> AddRow<'db> {
    pub(crate) fn new<I, N, V>(
        db: &'db Database,
        table: &str,
        values: I,
    ) -> Result<Self, SqliteWrapperError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        let mut assigned = Vec::new();
        for (column, value) in values {
            assign(&mut assigned, column.into(), value.into());
        }
        let values = assigned;
        if values.is_empty() {
            return Err(SqliteWrapperError::Input(
                "you must provide values to be added".into(),
            ));
        }
        Ok(Self {
            db,
            table: table.to_string(),
            values,
        })
    }

    /// Another column of the same row.
    #[must_use]
    pub fn and_add(&self, column: &str, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        assign(&mut next.values, column.to_string(), value.into());
        next
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        let columns: Vec<&str> = self.values.iter().map(|(c, _)| c.as_str()).collect();
        QueryNode::with_inputs(
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                columns.join(", "),
                vec!["?"; columns.len()].join(", ")
            ),
            self.values.iter().map(|(_, v)| v.clone()).collect(),
        )
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run(&self) -> Result<(), SqliteWrapperError> {
        self.run_with(Completion::EngineDefault)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run_with(&self, completion: Completion) -> Result<(), SqliteWrapperError> {
        self.db.write(self.query(), completion)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub async fn run_async(&self) -> Result<(), SqliteWrapperError> {
        self.db.write_async(self.query()).await
    }
}

/// `DELETE FROM table` plus an optional filter.
#[derive(Debug, Clone)]
pub struct RemoveRow<'db> {
    db: &'db Database,
    table: String,
    filter: Filter,
}

impl<'db> RemoveRow<'db> {
    pub(crate) fn new(db: &'db Database, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
            filter: Filter::default(),
        }
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        let mut node = QueryNode::new(format!("DELETE FROM {}", self.table));
        node.append(self.filter.compile());
        node
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run(&self) -> Result<(), SqliteWrapperError> {
        self.run_with(Completion::EngineDefault)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run_with(&self, completion: Completion) -> Result<(), SqliteWrapperError> {
        self.db.write(self.query(), completion)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub async fn run_async(&self) -> Result<(), SqliteWrapperError> {
        self.db.write_async(self.query()).await
    }
}

impl Filterable for RemoveRow<'_> {
    fn filter(&self) -> &Filter {
        &self.filter
    }

    fn with_filter(&self, filter: Filter) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }
}

/// `UPDATE table SET ...` plus an optional filter and sort.
#[derive(Debug, Clone)]
pub struct SetRow<'db> {
    db: &'db Database,
    table: String,
    values: Vec<(String, SetValue)>,
    filter: Filter,
    sort: Sort,
}

impl<'db> SetRow<'db> {
    pub(crate) fn new<I, N, V>(
        db: &'db Database,
        table: &str,
        values: I,
    ) -> Result<Self, SqliteWrapperError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<SetValue>,
    {
        let mut assigned = Vec::new();
        for (column, value) in values {
            let (column, value) = checked(column.into(), value.into())?;
            assign(&mut assigned, column, value);
        }
        let values = assigned;
        if values.is_empty() {
            return Err(SqliteWrapperError::Input(
                "you must provide values to be set".into(),
            ));
        }
        Ok(Self {
            db,
            table: table.to_string(),
            values,
            filter: Filter::default(),
            sort: Sort::default(),
        })
    }

    /// Another assignment in the same statement.
    ///
    /// # Errors
    /// `SqliteWrapperError::Type` for a non-numeric increment.
    pub fn and_set(
        &self,
        column: &str,
        value: impl Into<SetValue>,
    ) -> Result<Self, SqliteWrapperError> {
        let mut next = self.clone();
        let (column, value) = checked(column.to_string(), value.into())?;
        assign(&mut next.values, column, value);
        Ok(next)
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        let mut assignments = Vec::with_capacity(self.values.len());
        let mut inputs = Vec::new();
        for (column, value) in &self.values {
            match value {
                SetValue::Value(Value::Null) | SetValue::Null => {
                    assignments.push(format!("{column}=NULL"));
                }
                SetValue::Value(value) => {
                    assignments.push(format!("{column}=?"));
                    inputs.push(value.clone());
                }
                SetValue::Increment(by) => {
                    assignments.push(format!("{column}={column}+?"));
                    inputs.push(by.clone());
                }
                SetValue::Concatenate(suffix) => {
                    assignments.push(format!("{column}={column} || ?"));
                    inputs.push(Value::Text(suffix.clone()));
                }
            }
        }
        let mut node = QueryNode::with_inputs(
            format!("UPDATE {} SET {}", self.table, assignments.join(", ")),
            inputs,
        );
        node.append(self.filter.compile());
        node.append(self.sort.compile());
        node
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run(&self) -> Result<(), SqliteWrapperError> {
        self.run_with(Completion::EngineDefault)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run_with(&self, completion: Completion) -> Result<(), SqliteWrapperError> {
        self.db.write(self.query(), completion)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub async fn run_async(&self) -> Result<(), SqliteWrapperError> {
        self.db.write_async(self.query()).await
    }
}

fn checked(column: String, value: SetValue) -> Result<(String, SetValue), SqliteWrapperError> {
    if let SetValue::Increment(by) = &value {
        if !by.is_numeric() {
            return Err(SqliteWrapperError::type_error(format!(
                "cannot increment '{column}' by a non-numeric value"
            )));
        }
    }
    Ok((column, value))
}

impl Filterable for SetRow<'_> {
    fn filter(&self) -> &Filter {
        &self.filter
    }

    fn with_filter(&self, filter: Filter) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }
}

impl Sortable for SetRow<'_> {
    fn sort_spec(&self) -> &Sort {
        &self.sort
    }

    fn with_sort(&self, sort: Sort) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }
}

/// A repeated column replaces its earlier value in place.
fn assign<V>(values: &mut Vec<(String, V)>, column: String, value: V) {
    match values.iter_mut().find(|(existing, _)| *existing == column) {
        Some((_, slot)) => *slot = value,
        None => values.push((column, value)),
    }
}
