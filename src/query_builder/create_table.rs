use crate::db::Database;
use crate::engine::Completion;
use crate::error::SqliteWrapperError;
use crate::schema::{ColumnDef, ColumnSpec, Constraint, resolve_column, validate_table};
use crate::table::Table;

use super::statement::QueryNode;

/// `CREATE TABLE IF NOT EXISTS`, validated when built.
#[derive(Debug, Clone)]
pub struct CreateTable<'db> {
    db: &'db Database,
    name: String,
    columns: Vec<ColumnDef>,
}

impl<'db> CreateTable<'db> {
    pub(crate) fn new<I, N, S>(
        db: &'db Database,
        name: &str,
        columns: I,
    ) -> Result<Self, SqliteWrapperError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<ColumnSpec>,
    {
        let columns = columns
            .into_iter()
            .map(|(column, spec)| {
                let column: String = column.into();
                resolve_column(&column, &spec.into(), db)
            })
            .collect::<Result<Vec<_>, _>>()?;
        validate_table(&columns)?;
        Ok(Self {
            db,
            name: name.to_string(),
            columns,
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        render(&self.name, &self.columns)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run(&self) -> Result<Table<'db>, SqliteWrapperError> {
        self.run_with(Completion::EngineDefault)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run_with(&self, completion: Completion) -> Result<Table<'db>, SqliteWrapperError> {
        self.db.write(self.query(), completion)?;
        Ok(Table::new(self.db, &self.name))
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub async fn run_async(&self) -> Result<Table<'db>, SqliteWrapperError> {
        self.db.write_async(self.query()).await?;
        Ok(Table::new(self.db, &self.name))
    }
}

pub(crate) fn render(name: &str, columns: &[ColumnDef]) -> QueryNode {
    let mut lines = Vec::with_capacity(columns.len() + 1);
    let mut primaries = Vec::new();
    let mut autoincrement = false;

    for column in columns {
        let mut line = format!("{} {}", column.name, column.base_type);
        match &column.constraint {
            Constraint::Primary { autoincrement: true } => {
                autoincrement = true;
                line.push_str(" NOT NULL PRIMARY KEY AUTOINCREMENT");
                primaries.push(column.name.as_str());
            }
            Constraint::Primary { autoincrement: false } => {
                line.push_str(" NOT NULL");
                primaries.push(column.name.as_str());
            }
            Constraint::Foreign { table, column } => {
                line.push_str(&format!(" NOT NULL REFERENCES {table}({column})"));
            }
            Constraint::Default(value) => {
                line.push_str(" DEFAULT ");
                line.push_str(&value.to_literal());
            }
            Constraint::Unique => line.push_str(" NOT NULL UNIQUE"),
            Constraint::NotNull => line.push_str(" NOT NULL"),
            Constraint::Nullable => {}
        }
        lines.push(line);
    }
    if !autoincrement && !primaries.is_empty() {
        lines.push(format!("PRIMARY KEY ({})", primaries.join(", ")));
    }
    QueryNode::new(format!(
        "CREATE TABLE IF NOT EXISTS {name} ({})",
        lines.join(", ")
    ))
}
