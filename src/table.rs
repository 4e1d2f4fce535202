use crate::db::Database;
use crate::error::SqliteWrapperError;
use crate::query_builder::{AddColumn, AddRow, GetMode, GetRow, RemoveRow, SetRow};
use crate::schema::{Catalog, ColumnSpec, ForeignKey, TableRef};
use crate::types::{SetValue, Value};

/// Handle to one table of a [`Database`].
#[derive(Debug, Clone)]
pub struct Table<'db> {
    db: &'db Database,
    name: String,
}

impl<'db> Table<'db> {
    pub(crate) fn new(db: &'db Database, name: &str) -> Self {
        Self {
            db,
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn database(&self) -> &'db Database {
        self.db
    }

    /// Rename the table; this handle follows the new name.
    ///
    /// # Errors
    /// `SqliteWrapperError::Table` if a table called `new_name` already exists.
    pub fn rename(&mut self, new_name: &str) -> Result<(), SqliteWrapperError> {
        if self.db.exists(new_name)? {
            return Err(SqliteWrapperError::Table("table already exists".into()));
        }
        self.db
            .raw_write(
                &format!("ALTER TABLE {} RENAME TO {new_name}", self.name),
                Vec::new(),
            )
            .run()?;
        self.name = new_name.to_string();
        Ok(())
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the table cannot be dropped.
    pub fn drop(self) -> Result<(), SqliteWrapperError> {
        self.db.drop(&self.name)
    }

    /// Start an `ALTER TABLE ... ADD COLUMN`.
    ///
    /// # Errors
    /// `Table` if the column exists, `Type` for constraints a new column cannot carry.
    pub fn add_column(
        &self,
        name: &str,
        spec: impl Into<ColumnSpec>,
    ) -> Result<AddColumn<'db>, SqliteWrapperError> {
        AddColumn::new(self.db, &self.name, name, &spec.into())
    }

    /// # Errors
    /// Always `SqliteWrapperError::Unimplemented`.
    pub fn remove_column(&self, _name: &str) -> Result<(), SqliteWrapperError> {
        Err(SqliteWrapperError::Unimplemented(
            "removing columns has not yet been implemented".into(),
        ))
    }

    /// Start an `INSERT` of one row.
    ///
    /// # Errors
    /// `SqliteWrapperError::Input` if no values are given.
    pub fn add<I, N, V>(&self, values: I) -> Result<AddRow<'db>, SqliteWrapperError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        AddRow::new(self.db, &self.name, values)
    }

    #[must_use]
    pub fn remove(&self) -> RemoveRow<'db> {
        RemoveRow::new(self.db, &self.name)
    }

    /// First matching row; no items selects every column.
    #[must_use]
    pub fn get<I, S>(&self, items: I) -> GetRow<'db>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GetRow::new(self.db, &self.name, GetMode::First, items)
    }

    /// Every matching row; no items selects every column.
    #[must_use]
    pub fn get_all<I, S>(&self, items: I) -> GetRow<'db>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GetRow::new(self.db, &self.name, GetMode::All, items)
    }

    /// Start an `UPDATE`.
    ///
    /// # Errors
    /// `Input` if no values are given, `Type` for a non-numeric increment.
    pub fn set<I, N, V>(&self, values: I) -> Result<SetRow<'db>, SqliteWrapperError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<SetValue>,
    {
        SetRow::new(self.db, &self.name, values)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed.
    pub fn exists(&self) -> Result<bool, SqliteWrapperError> {
        self.db.exists(&self.name)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed.
    pub fn columns(&self) -> Result<Vec<String>, SqliteWrapperError> {
        Ok(self
            .column_types()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// Column names with their declared types.
    ///
    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed.
    pub fn column_types(&self) -> Result<Vec<(String, String)>, SqliteWrapperError> {
        Catalog::column_types(self.db, &self.name)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the table is missing.
    pub fn rows(&self) -> Result<i64, SqliteWrapperError> {
        if self.db.separate_thread() {
            self.db.wait_for_queue()?;
        }
        let counted = self
            .db
            .raw_read(&format!("SELECT COUNT(*) AS count FROM {}", self.name), Vec::new())
            .run()?;
        Ok(counted
            .first_column()
            .first()
            .and_then(Value::as_int)
            .unwrap_or(0))
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed.
    pub fn primary_keys(&self) -> Result<Vec<String>, SqliteWrapperError> {
        Catalog::primary_keys(self.db, &self.name)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed.
    pub fn foreign_keys(&self) -> Result<Vec<ForeignKey>, SqliteWrapperError> {
        Catalog::foreign_keys(self.db, &self.name)
    }
}

impl From<&Table<'_>> for TableRef {
    fn from(table: &Table<'_>) -> Self {
        TableRef::Handle {
            name: table.name.clone(),
            database: table.db.id(),
        }
    }
}
