//! Row containers returned by reads.
//!
//! Raw reads yield a [`ResultSet`]; structured gets yield [`Fetched`], which
//! collapses single-column results to bare scalars.

mod fetched;
mod result_set;
mod row;

pub use fetched::Fetched;
pub use result_set::ResultSet;
pub use row::Row;
