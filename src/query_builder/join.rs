use std::fmt;

use crate::error::SqliteWrapperError;
use crate::schema::{Catalog, sole_primary_key};

use super::statement::QueryNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    Inner,
    #[default]
    Left,
    Right,
    Full,
}

impl JoinKind {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// A resolved link from the query's table to another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub right_table: String,
    pub left_column: String,
    pub right_column: String,
}

impl JoinSpec {
    /// Resolve a join from `left_table`.
    ///
    /// * no `left`: the left table must have exactly one foreign key, which supplies both sides.
    /// * `left` without `right`: `left` must be a foreign key; its target supplies the right side.
    /// * `right` is written `table.column`.
    ///
    /// # Errors
    /// `SqliteWrapperError::Instance` when a side cannot be resolved.
    pub fn resolve(
        kind: JoinKind,
        left_table: &str,
        left: Option<&str>,
        right: Option<&str>,
        catalog: &dyn Catalog,
    ) -> Result<JoinSpec, SqliteWrapperError> {
        let foreign_keys = catalog.foreign_keys(left_table)?;
        let left_column = match left {
            Some(column) => {
                let exists = catalog
                    .column_types(left_table)?
                    .iter()
                    .any(|(name, _)| name == column);
                if !exists {
                    return Err(SqliteWrapperError::instance(format!(
                        "column '{column}' does not exist in left table '{left_table}'"
                    )));
                }
                column.to_string()
            }
            None => match foreign_keys.as_slice() {
                [] => {
                    return Err(SqliteWrapperError::instance(
                        "left table has no foreign key",
                    ));
                }
                [key] => key.from.clone(),
                _ => {
                    return Err(SqliteWrapperError::instance(
                        "left table has multiple foreign keys; you must specify which one to reference",
                    ));
                }
            },
        };

        let (right_table, right_column) = match right {
            Some(qualified) => explicit_right(qualified, catalog)?,
            None => {
                let key = foreign_keys
                    .iter()
                    .find(|key| key.from == left_column)
                    .ok_or_else(|| {
                        SqliteWrapperError::instance(format!(
                            "column '{left_column}' is not a foreign key"
                        ))
                    })?;
                let column = match &key.to {
                    Some(to) => to.clone(),
                    None => sole_primary_key(catalog, &key.table)?,
                };
                (key.table.clone(), column)
            }
        };

        Ok(JoinSpec {
            kind,
            right_table,
            left_column,
            right_column,
        })
    }

    /// ` KIND JOIN right ON left.lc=right.rc`
    #[must_use]
    pub fn compile(&self, left_table: &str) -> QueryNode {
        QueryNode::new(format!(
            " {} JOIN {} ON {left_table}.{}={}.{}",
            self.kind, self.right_table, self.left_column, self.right_table, self.right_column
        ))
    }
}

fn explicit_right(
    qualified: &str,
    catalog: &dyn Catalog,
) -> Result<(String, String), SqliteWrapperError> {
    let Some((table, column)) = qualified.split_once('.') else {
        return Err(SqliteWrapperError::instance(format!(
            "you must specify the table for the right column eg: 'table.{qualified}'"
        )));
    };
    if !catalog.table_names()?.iter().any(|t| t == table) {
        return Err(SqliteWrapperError::instance(format!(
            "table '{table}' does not exist"
        )));
    }
    if !catalog
        .column_types(table)?
        .iter()
        .any(|(name, _)| name == column)
    {
        return Err(SqliteWrapperError::instance(format!(
            "column '{column}' does not exist in right table '{table}'"
        )));
    }
    Ok((table.to_string(), column.to_string()))
}
