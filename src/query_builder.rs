//! Fluent statement builders.
//!
//! Each builder compiles to a [`QueryNode`]: SQL text with `?` placeholders and
//! the positional inputs bound to them. Chained calls take `&self` and return a
//! new builder, so a partially built query can be reused as the base for
//! several continuations.

mod add_column;
mod create_table;
mod dml;
mod filter;
mod join;
mod raw;
mod select;
mod sort;
mod statement;

pub use add_column::AddColumn;
pub use create_table::CreateTable;
pub use dml::{AddRow, RemoveRow, SetRow};
pub use filter::{Condition, Conjunction, Filter, FilterClause, Filterable, Operator};
pub use join::{JoinKind, JoinSpec};
pub use raw::{RawRead, RawWrite};
pub use select::{GetMode, GetRow};
pub use sort::{Order, Sort, Sortable};
pub use statement::QueryNode;
