use rusqlite::types::Value as SqliteValue;
use rusqlite::{Connection, params_from_iter};

use crate::error::SqliteWrapperError;
use crate::query_builder::QueryNode;
use crate::results::{Fetched, ResultSet};

use super::{OperationKind, Output, ReadShape};

/// Run one statement against the connection.
///
/// Writes run inside their own transaction, so a failed write commits nothing.
pub(super) fn execute(
    conn: &mut Connection,
    kind: OperationKind,
    statement: &QueryNode,
) -> Result<Output, SqliteWrapperError> {
    let outcome = match kind {
        OperationKind::Write => execute_write(conn, statement).map(|()| Output::Written),
        OperationKind::Read(shape) => execute_read(conn, shape, statement),
    };
    outcome.map_err(|err| query_error(&err, statement))
}

fn execute_write(conn: &mut Connection, statement: &QueryNode) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(statement.sql())?;
        stmt.execute(params_from_iter(bound(statement)))?;
    }
    tx.commit()
}

fn execute_read(
    conn: &Connection,
    shape: ReadShape,
    statement: &QueryNode,
) -> rusqlite::Result<Output> {
    let first_only = matches!(shape, ReadShape::First { .. });
    let result_set = build_result_set(conn, statement, first_only)?;
    let output = match shape {
        ReadShape::Raw => Output::Rows(result_set),
        ReadShape::First { simplify } => {
            let fetched = match result_set.rows.into_iter().next() {
                None => Fetched::NoRow,
                Some(row) if simplify => Fetched::Value(row.into_first()),
                Some(row) => Fetched::Row(row),
            };
            Output::Fetched(fetched)
        }
        ReadShape::All { simplify: true } => {
            Output::Fetched(Fetched::Values(result_set.first_column()))
        }
        ReadShape::All { simplify: false } => Output::Fetched(Fetched::Rows(result_set.rows)),
    };
    Ok(output)
}

fn build_result_set(
    conn: &Connection,
    statement: &QueryNode,
    first_only: bool,
) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare(statement.sql())?;
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let column_count = column_names.len();
    let mut result_set = ResultSet::with_columns(column_names);

    let mut rows = stmt.query(params_from_iter(bound(statement)))?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            let value: SqliteValue = row.get(idx)?;
            values.push(value.into());
        }
        result_set.add_row_values(values);
        if first_only {
            break;
        }
    }
    Ok(result_set)
}

fn bound(statement: &QueryNode) -> impl Iterator<Item = SqliteValue> + '_ {
    statement.inputs().iter().map(SqliteValue::from)
}

/// Wrap an engine failure with the statement and its inputs.
fn query_error(err: &rusqlite::Error, statement: &QueryNode) -> SqliteWrapperError {
    let message = match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => message.clone(),
        other => other.to_string(),
    };
    SqliteWrapperError::Query {
        message,
        query: statement.sql().to_string(),
        inputs: statement.display_inputs(),
    }
}
