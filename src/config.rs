use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::SqliteWrapperError;

/// Options for opening a [`Database`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    pub path: String,
    /// Execute statements on a dedicated worker thread.
    pub separate_thread: bool,
    /// Default for `run()` in worker mode: block until the statement has executed.
    pub await_completion: bool,
    /// `PRAGMA foreign_keys = ON`
    pub foreign_keys: bool,
    /// `PRAGMA journal_mode = WAL`
    pub journal_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            separate_thread: false,
            await_completion: true,
            foreign_keys: false,
            journal_wal: false,
        }
    }
}

impl DatabaseOptions {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse options from JSON; omitted fields take their defaults.
    ///
    /// # Errors
    /// `SqliteWrapperError::Config` if the document is not valid options JSON.
    pub fn from_json(json: &str) -> Result<Self, SqliteWrapperError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The file actually opened: `.db` is appended unless already present.
    #[must_use]
    pub fn resolved_path(&self) -> String {
        if self.path == ":memory:" || self.path.ends_with(".db") {
            self.path.clone()
        } else {
            format!("{}.db", self.path)
        }
    }

    /// Database name: the file stem of the resolved path.
    #[must_use]
    pub fn name(&self) -> String {
        let path = self.resolved_path();
        let file = path.rsplit(['/', '\\']).next().unwrap_or(&path);
        file.strip_suffix(".db").unwrap_or(file).to_string()
    }

    /// Statements run once after the connection opens.
    pub(crate) fn pragmas(&self) -> String {
        let mut batch = String::new();
        if self.foreign_keys {
            batch.push_str("PRAGMA foreign_keys = ON;\n");
        }
        if self.journal_wal {
            batch.push_str("PRAGMA journal_mode = WAL;\n");
        }
        batch
    }
}

/// Fluent builder for [`DatabaseOptions`].
#[derive(Debug, Clone)]
pub struct DatabaseOptionsBuilder {
    opts: DatabaseOptions,
}

impl DatabaseOptionsBuilder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            opts: DatabaseOptions::new(path),
        }
    }

    #[must_use]
    pub fn separate_thread(mut self, separate_thread: bool) -> Self {
        self.opts.separate_thread = separate_thread;
        self
    }

    #[must_use]
    pub fn await_completion(mut self, await_completion: bool) -> Self {
        self.opts.await_completion = await_completion;
        self
    }

    #[must_use]
    pub fn foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.opts.foreign_keys = foreign_keys;
        self
    }

    #[must_use]
    pub fn journal_wal(mut self, journal_wal: bool) -> Self {
        self.opts.journal_wal = journal_wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> DatabaseOptions {
        self.opts
    }

    /// Open the database with these options.
    ///
    /// # Errors
    /// Returns `SqliteWrapperError` if the file cannot be opened, a pragma fails,
    /// or the worker thread cannot be spawned.
    pub fn open(self) -> Result<Database, SqliteWrapperError> {
        Database::with_options(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_get_a_db_suffix() {
        let opts = DatabaseOptions::new("data/app");
        assert_eq!(opts.resolved_path(), "data/app.db");
        assert_eq!(opts.name(), "app");

        let explicit = DatabaseOptions::new("C:\\dbs\\store.db");
        assert_eq!(explicit.resolved_path(), "C:\\dbs\\store.db");
        assert_eq!(explicit.name(), "store");

        let memory = DatabaseOptions::new(":memory:");
        assert_eq!(memory.resolved_path(), ":memory:");
    }

    #[test]
    fn json_fills_defaults() {
        let opts = DatabaseOptions::from_json(r#"{"path": "x", "separate_thread": true}"#).unwrap();
        assert!(opts.separate_thread);
        assert!(opts.await_completion);
        assert!(!opts.foreign_keys);

        let err = DatabaseOptions::from_json("{\"path\": 3}").unwrap_err();
        assert!(matches!(err, SqliteWrapperError::Config(_)));
    }

    #[test]
    fn builder_sets_pragmas() {
        let opts = DatabaseOptionsBuilder::new("x")
            .foreign_keys(true)
            .journal_wal(true)
            .finish();
        assert_eq!(
            opts.pragmas(),
            "PRAGMA foreign_keys = ON;\nPRAGMA journal_mode = WAL;\n"
        );
        assert!(DatabaseOptions::default().pragmas().is_empty());
    }
}
