use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::Connection;

use crate::config::{DatabaseOptions, DatabaseOptionsBuilder};
use crate::engine::{Completion, Engine, OperationKind, Output, ReadShape};
use crate::error::SqliteWrapperError;
use crate::query_builder::{CreateTable, QueryNode, RawRead, RawWrite};
use crate::results::ResultSet;
use crate::schema::{Catalog, ColumnSpec, DatabaseId, ForeignKey};
use crate::table::Table;
use crate::types::Value;

static NEXT_DATABASE_ID: AtomicU64 = AtomicU64::new(1);

/// A single SQLite database and the engine that executes against it.
///
/// ```rust,no_run
/// use sqlite_wrapper::prelude::*;
///
/// # fn main() -> Result<(), SqliteWrapperError> {
/// let db = Database::open("app")?;
/// let users = db
///     .create(
///         "users",
///         [
///             ("id", ColumnSpec::autoincrement()),
///             ("name", ColumnSpec::not_null(BaseType::Text)),
///         ],
///         false,
///     )?
///     .run()?;
/// users.add([("name", "alice")])?.run()?;
/// let id = users.get(["id"]).where_("name")?.eq("alice")?.run()?;
/// # let _ = id;
/// # Ok(())
/// # }
/// ```
pub struct Database {
    id: DatabaseId,
    name: String,
    path: String,
    engine: Engine,
}

impl Database {
    /// Open `path` with default options (`.db` is appended when missing).
    ///
    /// # Errors
    /// Returns `SqliteWrapperError` if the file cannot be opened.
    pub fn open(path: impl Into<String>) -> Result<Self, SqliteWrapperError> {
        Self::with_options(DatabaseOptions::new(path))
    }

    #[must_use]
    pub fn builder(path: impl Into<String>) -> DatabaseOptionsBuilder {
        DatabaseOptionsBuilder::new(path)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the file cannot be opened, a pragma fails,
    /// or the worker thread cannot be spawned.
    pub fn with_options(opts: DatabaseOptions) -> Result<Self, SqliteWrapperError> {
        let path = opts.resolved_path();
        let name = opts.name();
        let conn = Connection::open(&path)?;
        let pragmas = opts.pragmas();
        if !pragmas.is_empty() {
            conn.execute_batch(&pragmas)?;
        }
        let engine = Engine::start(conn, &name, opts.separate_thread, opts.await_completion)?;
        tracing::info!(
            name = %name,
            path = %path,
            separate_thread = opts.separate_thread,
            "opened database"
        );
        Ok(Self {
            id: NEXT_DATABASE_ID.fetch_add(1, Ordering::Relaxed),
            name,
            path,
            engine,
        })
    }

    #[must_use]
    pub fn id(&self) -> DatabaseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.engine.is_alive()
    }

    pub(crate) fn separate_thread(&self) -> bool {
        self.engine.separate_thread()
    }

    /// Handle to an existing table.
    ///
    /// # Errors
    /// `SqliteWrapperError::Table` if the table does not exist.
    pub fn table(&self, name: &str) -> Result<Table<'_>, SqliteWrapperError> {
        if !self.exists(name)? {
            return Err(SqliteWrapperError::Table("table does not exist".into()));
        }
        Ok(Table::new(self, name))
    }

    /// Start a `CREATE TABLE`. Columns are validated, and foreign keys resolved, here.
    ///
    /// # Errors
    /// `Table` if `must_not_exist` is set and the table exists, otherwise any
    /// column validation error.
    pub fn create<I, N, S>(
        &self,
        name: &str,
        columns: I,
        must_not_exist: bool,
    ) -> Result<CreateTable<'_>, SqliteWrapperError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<ColumnSpec>,
    {
        if must_not_exist && self.exists(name)? {
            return Err(SqliteWrapperError::Table("table already exists".into()));
        }
        CreateTable::new(self, name, columns)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the table cannot be dropped.
    pub fn drop(&self, name: &str) -> Result<(), SqliteWrapperError> {
        self.raw_write(&format!("DROP TABLE {name}"), Vec::new()).run()
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed.
    pub fn exists(&self, name: &str) -> Result<bool, SqliteWrapperError> {
        Ok(self.tables()?.iter().any(|table| table == name))
    }

    /// Every user table; SQLite's internal `sqlite_*` tables are left out.
    ///
    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed.
    pub fn tables(&self) -> Result<Vec<String>, SqliteWrapperError> {
        let rows = self.introspect(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            Vec::new(),
        )?;
        Ok(text_column(&rows, 0))
    }

    /// Operations waiting in the queues plus the one executing.
    #[must_use]
    pub fn queue(&self) -> usize {
        self.engine.queue_len()
    }

    /// # Errors
    /// `SqliteWrapperError::Closed` if the database is closed.
    pub fn wait_for_queue(&self) -> Result<(), SqliteWrapperError> {
        self.engine.wait_for_queue()
    }

    /// Close the database. Unless `ignore_queue` is set, queued operations run first;
    /// otherwise they are answered with `Interrupted`.
    ///
    /// # Errors
    /// `SqliteWrapperError::Closed` if the database is already closed.
    pub fn close(&self, ignore_queue: bool) -> Result<(), SqliteWrapperError> {
        self.engine.close(ignore_queue)
    }

    /// # Errors
    /// Always `SqliteWrapperError::Unimplemented`.
    pub fn optimise(&self) -> Result<(), SqliteWrapperError> {
        Err(SqliteWrapperError::Unimplemented(
            "database optimising has not yet been implemented".into(),
        ))
    }

    #[must_use]
    pub fn raw_read(&self, sql: &str, inputs: Vec<Value>) -> RawRead<'_> {
        RawRead::new(self, sql, inputs)
    }

    #[must_use]
    pub fn raw_write(&self, sql: &str, inputs: Vec<Value>) -> RawWrite<'_> {
        RawWrite::new(self, sql, inputs)
    }

    pub(crate) fn write(
        &self,
        statement: QueryNode,
        completion: Completion,
    ) -> Result<(), SqliteWrapperError> {
        self.engine
            .submit(OperationKind::Write, statement, completion)
            .map(|_| ())
    }

    pub(crate) async fn write_async(&self, statement: QueryNode) -> Result<(), SqliteWrapperError> {
        self.engine
            .submit_async(OperationKind::Write, statement)
            .await
            .map(|_| ())
    }

    pub(crate) fn read(
        &self,
        shape: ReadShape,
        statement: QueryNode,
    ) -> Result<Output, SqliteWrapperError> {
        self.engine
            .submit(OperationKind::Read(shape), statement, Completion::Wait)?
            .ok_or_else(|| SqliteWrapperError::Connection("read finished without output".into()))
    }

    pub(crate) async fn read_async(
        &self,
        shape: ReadShape,
        statement: QueryNode,
    ) -> Result<Output, SqliteWrapperError> {
        self.engine
            .submit_async(OperationKind::Read(shape), statement)
            .await
    }

    /// Schema reads see every write submitted before them.
    fn introspect(&self, sql: &str, inputs: Vec<Value>) -> Result<ResultSet, SqliteWrapperError> {
        if self.separate_thread() {
            self.engine.wait_for_queue()?;
        }
        self.raw_read(sql, inputs).run()
    }
}

fn text_column(rows: &ResultSet, index: usize) -> Vec<String> {
    rows.rows
        .iter()
        .filter_map(|row| row.get_by_index(index).and_then(Value::as_text))
        .map(str::to_string)
        .collect()
}

impl Catalog for Database {
    fn database_id(&self) -> DatabaseId {
        self.id
    }

    fn table_names(&self) -> Result<Vec<String>, SqliteWrapperError> {
        self.tables()
    }

    fn column_types(&self, table: &str) -> Result<Vec<(String, String)>, SqliteWrapperError> {
        let rows = self.introspect(
            "SELECT name, type FROM pragma_table_info(?) ORDER BY cid",
            vec![Value::from(table)],
        )?;
        Ok(rows
            .rows
            .iter()
            .map(|row| {
                let text = |idx| {
                    row.get_by_index(idx)
                        .and_then(Value::as_text)
                        .unwrap_or_default()
                        .to_string()
                };
                (text(0), text(1))
            })
            .collect())
    }

    fn primary_keys(&self, table: &str) -> Result<Vec<String>, SqliteWrapperError> {
        let rows = self.introspect(
            "SELECT name FROM pragma_table_info(?) WHERE pk > 0 ORDER BY pk",
            vec![Value::from(table)],
        )?;
        Ok(text_column(&rows, 0))
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, SqliteWrapperError> {
        let rows = self.introspect(
            "SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?) ORDER BY id, seq",
            vec![Value::from(table)],
        )?;
        Ok(rows
            .rows
            .iter()
            .map(|row| {
                let text = |idx| {
                    row.get_by_index(idx)
                        .and_then(Value::as_text)
                        .map(str::to_string)
                };
                ForeignKey {
                    table: text(0).unwrap_or_default(),
                    from: text(1).unwrap_or_default(),
                    to: text(2),
                }
            })
            .collect())
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaseType;

    #[test]
    fn introspection_reads_the_schema() {
        let db = Database::open(":memory:").unwrap();
        db.create(
            "users",
            [
                ("id", ColumnSpec::autoincrement()),
                ("name", ColumnSpec::not_null(BaseType::Text)),
            ],
            false,
        )
        .unwrap()
        .run()
        .unwrap();
        db.create(
            "posts",
            [
                ("id", ColumnSpec::autoincrement()),
                ("author", ColumnSpec::foreign("users")),
            ],
            false,
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(db.tables().unwrap(), vec!["posts".to_string(), "users".to_string()]);
        assert_eq!(
            db.column_types("users").unwrap(),
            vec![
                ("id".to_string(), "INTEGER".to_string()),
                ("name".to_string(), "TEXT".to_string())
            ]
        );
        assert_eq!(db.primary_keys("posts").unwrap(), vec!["id".to_string()]);
        assert_eq!(
            db.foreign_keys("posts").unwrap(),
            vec![ForeignKey {
                table: "users".into(),
                from: "author".into(),
                to: Some("id".into()),
            }]
        );
    }

    #[test]
    fn table_handles_require_existing_tables() {
        let db = Database::open(":memory:").unwrap();
        assert!(matches!(db.table("nope"), Err(SqliteWrapperError::Table(_))));
        db.create("t", [("a", BaseType::Text)], false)
            .unwrap()
            .run()
            .unwrap();
        assert!(db.table("t").is_ok());
        assert!(matches!(
            db.create("t", [("a", BaseType::Text)], true),
            Err(SqliteWrapperError::Table(_))
        ));
        assert!(matches!(db.optimise(), Err(SqliteWrapperError::Unimplemented(_))));
    }
}
