use thiserror::Error;

use crate::engine::CorrelationId;

/// The single error type every fallible operation in this crate returns.
#[derive(Debug, Error)]
pub enum SqliteWrapperError {
    /// Raised by the storage engine outside of statement execution (open, pragmas, close).
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A handle or reference points at something that does not exist or belongs elsewhere.
    #[error("Instance error: {0}")]
    Instance(String),

    /// A table or column already exists, or is missing.
    #[error("Table error: {0}")]
    Table(String),

    /// Ordering or limiting requested before any sort columns were given.
    #[error("Sort error: {0}")]
    Sort(String),

    /// Comparison chaining used without (or on top of) an active clause.
    #[error("Logic error: {0}")]
    Logic(String),

    /// Required columns or values were not provided.
    #[error("Input error: {0}")]
    Input(String),

    /// A value or declared type is not valid where it was used.
    #[error("Type error: {0}")]
    Type(String),

    /// The storage engine rejected a compiled statement.
    #[error("{}", render_query_error(.message, .query, .inputs))]
    Query {
        message: String,
        query: String,
        inputs: Vec<String>,
    },

    /// The database is closed, or was closed while waiting.
    #[error("Database error: {0}")]
    Closed(String),

    /// The operation was still queued when the database was closed.
    #[error("Database error: operation {0} was interrupted by close")]
    Interrupted(CorrelationId),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl SqliteWrapperError {
    /// `Type` errors are a refinement of input errors.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Type(_))
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub(crate) fn instance(message: impl Into<String>) -> Self {
        Self::Instance(message.into())
    }
}

fn render_query_error(message: &str, query: &str, inputs: &[String]) -> String {
    let mut rendered = format!("{message}\nOn query:\t{query}");
    if !inputs.is_empty() {
        rendered.push_str("\nWith values:\t");
        rendered.push_str(&inputs.join(", "));
    }
    rendered
}

impl From<serde_json::Error> for SqliteWrapperError {
    fn from(err: serde_json::Error) -> Self {
        SqliteWrapperError::Config(format!("invalid database options: {err}"))
    }
}
