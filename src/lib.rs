//! Fluent, typed SQL construction over a single SQLite connection.
//!
//! Builders compile to parameterized SQL ([`QueryNode`]) and run through an
//! execution engine that serializes every statement on one connection, either
//! inline on the caller's thread or on a dedicated worker with a read-priority
//! queue.
//!
//! ```rust,no_run
//! use sqlite_wrapper::prelude::*;
//!
//! # fn main() -> Result<(), SqliteWrapperError> {
//! let db = Database::builder("inventory").separate_thread(true).open()?;
//! let items = db
//!     .create(
//!         "items",
//!         [
//!             ("id", ColumnSpec::autoincrement()),
//!             ("name", ColumnSpec::unique(BaseType::Text)),
//!             ("stock", ColumnSpec::default(0)),
//!         ],
//!         false,
//!     )?
//!     .run()?;
//! items.add([("name", "bolt")])?.run()?;
//! items
//!     .set([("stock", SetValue::increment(5))])?
//!     .where_("name")?
//!     .eq("bolt")?
//!     .run()?;
//! let names = items.get_all(["name"]).sort(["id"]).asc()?.run()?.into_values();
//! # let _ = names;
//! db.close(false)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod schema;
pub mod table;
pub mod types;

pub use config::{DatabaseOptions, DatabaseOptionsBuilder};
pub use db::Database;
pub use engine::{Completion, CorrelationId};
pub use error::SqliteWrapperError;
pub use query_builder::QueryNode;
pub use results::{Fetched, ResultSet, Row};
pub use table::Table;
pub use types::{BaseType, SetValue, Value};
