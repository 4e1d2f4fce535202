use crate::db::Database;
use crate::engine::Completion;
use crate::error::SqliteWrapperError;
use crate::schema::{Catalog, ColumnDef, ColumnSpec, Constraint};
use crate::types::BaseType;

use super::statement::QueryNode;

/// `ALTER TABLE ... ADD COLUMN` for a single column.
///
/// Constraints that need every existing row rewritten (primary keys, unique,
/// not-null, foreign keys) are rejected up front.
#[derive(Debug, Clone)]
pub struct AddColumn<'db> {
    db: &'db Database,
    table: String,
    column: ColumnDef,
}

impl<'db> AddColumn<'db> {
    pub(crate) fn new(
        db: &'db Database,
        table: &str,
        name: &str,
        spec: &ColumnSpec,
    ) -> Result<Self, SqliteWrapperError> {
        let column = fresh_column(name, spec)?;
        if db.column_types(table)?.iter().any(|(existing, _)| existing == name) {
            return Err(SqliteWrapperError::Table("column already exists".into()));
        }
        Ok(Self {
            db,
            table: table.to_string(),
            column,
        })
    }

    /// Rebuild the table so restricted constraints can be added.
    ///
    /// # Errors
    /// Always `SqliteWrapperError::Unimplemented`.
    pub fn refit(&self) -> Result<Self, SqliteWrapperError> {
        Err(SqliteWrapperError::Unimplemented(
            "refitting tables has not yet been implemented".into(),
        ))
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        render(&self.table, &self.column)
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

fn fresh_column(name: &str, spec: &ColumnSpec) -> Result<ColumnDef, SqliteWrapperError> {
    spec.validate()?;
    let (base_type, constraint): (BaseType, Constraint) = match spec {
        ColumnSpec::Primary {
            autoincrement: true,
            ..
        } => {
            return Err(SqliteWrapperError::type_error(
                "cannot add an autoincrement value to a new column",
            ));
        }
        ColumnSpec::Primary { .. } => {
            return Err(SqliteWrapperError::type_error(
                "cannot add a primary key to a new column",
            ));
        }
        ColumnSpec::Unique(_) => {
            return Err(SqliteWrapperError::type_error(
                "cannot add a unique value to a new column",
            ));
        }
        ColumnSpec::NotNull(_) => {
            return Err(SqliteWrapperError::type_error(
                "cannot add a not null value to a new column",
            ));
        }
        ColumnSpec::Foreign { .. } => {
            return Err(SqliteWrapperError::type_error(
                "cannot add a foreign key to a new column",
            ));
        }
        ColumnSpec::Default(value) => {
            let base_type = value.base_type().ok_or_else(|| {
                SqliteWrapperError::type_error("'NULL' is an invalid data type for a default")
            })?;
            (base_type, Constraint::Default(value.clone()))
        }
        ColumnSpec::Nullable(base_type) => (*base_type, Constraint::Nullable),
    };
    Ok(ColumnDef {
        name: name.to_string(),
        base_type,
        constraint,
    })
}

fn render(table: &str, column: &ColumnDef) -> QueryNode {
    let mut sql = format!(
        "ALTER TABLE {table} ADD COLUMN {} {}",
        column.name, column.base_type
    );
    if let Constraint::Default(value) = &column.constraint {
        sql.push_str(" DEFAULT ");
        sql.push_str(&value.to_literal());
    }
    QueryNode::new(sql)
}
