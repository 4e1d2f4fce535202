//! Column declarations and their validation.
//!
//! A [`ColumnSpec`] is what callers write; a [`ColumnDef`] is the validated,
//! fully resolved form the compiler renders. Foreign keys are resolved against a
//! [`Catalog`], which copies the referenced column's base type onto the new column.

use crate::error::SqliteWrapperError;
use crate::types::{BaseType, Value};

/// Identity of an open database, used to reject cross-database references.
pub type DatabaseId = u64;

/// A table named by string, or by a handle obtained from a specific database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    Name(String),
    Handle { name: String, database: DatabaseId },
}

impl TableRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TableRef::Name(name) | TableRef::Handle { name, .. } => name,
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::Name(name.to_string())
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::Name(name)
    }
}

/// How a column is declared.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSpec {
    /// Part of the primary key. Non-autoincrement primaries form a composite key.
    Primary {
        base_type: BaseType,
        autoincrement: bool,
    },
    /// References a column of another table; the referenced primary key when `column` is `None`.
    Foreign {
        table: TableRef,
        column: Option<String>,
    },
    Unique(BaseType),
    /// Nullable column with a default; the base type follows the value.
    Default(Value),
    Nullable(BaseType),
    NotNull(BaseType),
}

impl ColumnSpec {
    #[must_use]
    pub fn primary(base_type: BaseType) -> Self {
        ColumnSpec::Primary {
            base_type,
            autoincrement: false,
        }
    }

    /// `INTEGER ... PRIMARY KEY AUTOINCREMENT`
    #[must_use]
    pub fn autoincrement() -> Self {
        ColumnSpec::Primary {
            base_type: BaseType::Integer,
            autoincrement: true,
        }
    }

    pub fn foreign(table: impl Into<TableRef>) -> Self {
        ColumnSpec::Foreign {
            table: table.into(),
            column: None,
        }
    }

    pub fn foreign_column(table: impl Into<TableRef>, column: impl Into<String>) -> Self {
        ColumnSpec::Foreign {
            table: table.into(),
            column: Some(column.into()),
        }
    }

    #[must_use]
    pub fn unique(base_type: BaseType) -> Self {
        ColumnSpec::Unique(base_type)
    }

    pub fn default(value: impl Into<Value>) -> Self {
        ColumnSpec::Default(value.into())
    }

    #[must_use]
    pub fn nullable(base_type: BaseType) -> Self {
        ColumnSpec::Nullable(base_type)
    }

    #[must_use]
    pub fn not_null(base_type: BaseType) -> Self {
        ColumnSpec::NotNull(base_type)
    }

    /// Declared base type; `None` for foreign keys, whose type comes from the referenced column.
    #[must_use]
    pub fn base_type(&self) -> Option<BaseType> {
        match self {
            ColumnSpec::Primary { base_type, .. }
            | ColumnSpec::Unique(base_type)
            | ColumnSpec::Nullable(base_type)
            | ColumnSpec::NotNull(base_type) => Some(*base_type),
            ColumnSpec::Default(value) => value.base_type(),
            ColumnSpec::Foreign { .. } => None,
        }
    }

    /// Checks that need no database access.
    ///
    /// # Errors
    /// Returns `SqliteWrapperError::Type` for autoincrement on a non-integer column or a
    /// NULL default.
    pub fn validate(&self) -> Result<(), SqliteWrapperError> {
        match self {
            ColumnSpec::Primary {
                base_type,
                autoincrement: true,
            } if *base_type != BaseType::Integer => Err(SqliteWrapperError::type_error(
                "primary keys with autoincrementation must be integers",
            )),
            ColumnSpec::Default(Value::Null) => Err(SqliteWrapperError::type_error(
                "'NULL' is an invalid data type for a default",
            )),
            _ => Ok(()),
        }
    }
}

impl From<BaseType> for ColumnSpec {
    fn from(base_type: BaseType) -> Self {
        ColumnSpec::Nullable(base_type)
    }
}

/// Resolved constraint of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Primary { autoincrement: bool },
    Foreign { table: String, column: String },
    Unique,
    Default(Value),
    Nullable,
    NotNull,
}

/// A validated column, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub base_type: BaseType,
    pub constraint: Constraint,
}

impl ColumnDef {
    #[must_use]
    pub fn is_primary(&self) -> bool {
        matches!(self.constraint, Constraint::Primary { .. })
    }

    #[must_use]
    pub fn is_autoincrement(&self) -> bool {
        matches!(
            self.constraint,
            Constraint::Primary {
                autoincrement: true
            }
        )
    }
}

/// One row of `PRAGMA foreign_key_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub from: String,
    /// `None` when the reference names only the table (implicit primary key).
    pub to: Option<String>,
}

/// Read access to the schema of one database.
pub trait Catalog {
    fn database_id(&self) -> DatabaseId;

    /// # Errors
    /// Propagates read failures.
    fn table_names(&self) -> Result<Vec<String>, SqliteWrapperError>;

    /// Column names with their declared types, in declaration order.
    ///
    /// # Errors
    /// Propagates read failures.
    fn column_types(&self, table: &str) -> Result<Vec<(String, String)>, SqliteWrapperError>;

    /// # Errors
    /// Propagates read failures.
    fn primary_keys(&self, table: &str) -> Result<Vec<String>, SqliteWrapperError>;

    /// # Errors
    /// Propagates read failures.
    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, SqliteWrapperError>;
}

/// The referenced table's only primary key.
///
/// # Errors
/// `SqliteWrapperError::Instance` when the table has none or several.
pub fn sole_primary_key(
    catalog: &dyn Catalog,
    table: &str,
) -> Result<String, SqliteWrapperError> {
    let mut keys = catalog.primary_keys(table)?;
    match keys.len() {
        0 => Err(SqliteWrapperError::instance(format!(
            "referenced table '{table}' has no primary key"
        ))),
        1 => Ok(keys.remove(0)),
        _ => Err(SqliteWrapperError::instance(format!(
            "referenced table '{table}' has multiple primary keys; you must specify which one to reference"
        ))),
    }
}

/// Validate one column and resolve it against `catalog`.
///
/// # Errors
/// `Type` for invalid declarations, `Instance` for unresolvable references.
pub fn resolve_column(
    name: &str,
    spec: &ColumnSpec,
    catalog: &dyn Catalog,
) -> Result<ColumnDef, SqliteWrapperError> {
    spec.validate()?;
    let (base_type, constraint) = match spec {
        ColumnSpec::Primary {
            base_type,
            autoincrement,
        } => (
            *base_type,
            Constraint::Primary {
                autoincrement: *autoincrement,
            },
        ),
        ColumnSpec::Foreign { table, column } => resolve_foreign(table, column.as_deref(), catalog)?,
        ColumnSpec::Unique(base_type) => (*base_type, Constraint::Unique),
        ColumnSpec::Default(value) => {
            let base_type = value.base_type().ok_or_else(|| {
                SqliteWrapperError::type_error("'NULL' is an invalid data type for a default")
            })?;
            (base_type, Constraint::Default(value.clone()))
        }
        ColumnSpec::Nullable(base_type) => (*base_type, Constraint::Nullable),
        ColumnSpec::NotNull(base_type) => (*base_type, Constraint::NotNull),
    };
    Ok(ColumnDef {
        name: name.to_string(),
        base_type,
        constraint,
    })
}

fn resolve_foreign(
    table: &TableRef,
    column: Option<&str>,
    catalog: &dyn Catalog,
) -> Result<(BaseType, Constraint), SqliteWrapperError> {
    if let TableRef::Handle { database, .. } = table {
        if *database != catalog.database_id() {
            return Err(SqliteWrapperError::instance(
                "foreign key table is from a different database",
            ));
        }
    }
    let table_name = table.name();
    if !catalog.table_names()?.iter().any(|t| t == table_name) {
        return Err(SqliteWrapperError::instance(format!(
            "table '{table_name}' does not exist"
        )));
    }

    let column = match column {
        Some(column) => column.to_string(),
        None => sole_primary_key(catalog, table_name)?,
    };
    let declared = catalog
        .column_types(table_name)?
        .into_iter()
        .find(|(name, _)| *name == column)
        .map(|(_, declared)| declared)
        .ok_or_else(|| {
            SqliteWrapperError::instance(format!(
                "column '{column}' does not exist in referenced table '{table_name}'"
            ))
        })?;
    let base_type = declared.parse::<BaseType>()?;
    Ok((
        base_type,
        Constraint::Foreign {
            table: table_name.to_string(),
            column,
        },
    ))
}

/// Table-wide rules: at least one column, and an autoincrementing key stands alone.
///
/// # Errors
/// `Input` for an empty table, `Type` when autoincrement is combined with other primaries.
pub fn validate_table(columns: &[ColumnDef]) -> Result<(), SqliteWrapperError> {
    if columns.is_empty() {
        return Err(SqliteWrapperError::Input(
            "you must provide columns for the table".into(),
        ));
    }
    let primaries = columns.iter().filter(|c| c.is_primary()).count();
    let autoincrements = columns.iter().filter(|c| c.is_autoincrement()).count();
    if autoincrements > 0 && primaries > 1 {
        return Err(SqliteWrapperError::type_error(
            "cannot autoincrement primary key with two or more primary keys. \
             Try using the 'unique' typing for the other keys",
        ));
    }
    Ok(())
}
