use crate::db::Database;
use crate::engine::{Completion, ReadShape};
use crate::error::SqliteWrapperError;
use crate::results::ResultSet;
use crate::types::Value;

use super::statement::QueryNode;

/// Caller-written statement text, executed with bound inputs.
#[derive(Debug, Clone)]
pub struct RawRead<'db> {
    db: &'db Database,
    statement: QueryNode,
}

impl<'db> RawRead<'db> {
    pub(crate) fn new(db: &'db Database, sql: &str, inputs: Vec<Value>) -> Self {
        Self {
            db,
            statement: QueryNode::with_inputs(sql, inputs),
        }
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        self.statement.clone()
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run(&self) -> Result<ResultSet, SqliteWrapperError> {
        Ok(self
            .db
            .read(ReadShape::Raw, self.statement.clone())?
            .into_result_set())
    }

    /// Same as [`RawRead::run`]; a read cannot be detached.
    ///
    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run_with(&self, _completion: Completion) -> Result<ResultSet, SqliteWrapperError> {
        self.run()
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub async fn run_async(&self) -> Result<ResultSet, SqliteWrapperError> {
        Ok(self
            .db
            .read_async(ReadShape::Raw, self.statement.clone())
            .await?
            .into_result_set())
    }
}

#[derive(Debug, Clone)]
pub struct RawWrite<'db> {
    db: &'db Database,
    statement: QueryNode,
}

impl<'db> RawWrite<'db> {
    pub(crate) fn new(db: &'db Database, sql: &str, inputs: Vec<Value>) -> Self {
        Self {
            db,
            statement: QueryNode::with_inputs(sql, inputs),
        }
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        self.statement.clone()
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run(&self) -> Result<(), SqliteWrapperError> {
        self.run_with(Completion::EngineDefault)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run_with(&self, completion: Completion) -> Result<(), SqliteWrapperError> {
        self.db.write(self.statement.clone(), completion)
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub async fn run_async(&self) -> Result<(), SqliteWrapperError> {
        self.db.write_async(self.statement.clone()).await
    }
}
