//! Convenient imports for common functionality.
//!
//! Brings the facades, value types, and the `Filterable`/`Sortable` builder
//! traits into scope in one line.

pub use crate::config::{DatabaseOptions, DatabaseOptionsBuilder};
pub use crate::db::Database;
pub use crate::engine::{Completion, CorrelationId};
pub use crate::error::SqliteWrapperError;
pub use crate::query_builder::{
    AddColumn, AddRow, CreateTable, Filterable, GetMode, GetRow, JoinKind, Order, QueryNode,
    RawRead, RawWrite, RemoveRow, SetRow, Sortable,
};
pub use crate::results::{Fetched, ResultSet, Row};
pub use crate::schema::{ColumnSpec, ForeignKey, TableRef};
pub use crate::table::Table;
pub use crate::types::{BaseType, SetValue, Value};
