use crate::error::SqliteWrapperError;

use super::statement::QueryNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// `ORDER BY` columns, direction, and an optional row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sort {
    columns: Vec<String>,
    order: Order,
    limit: Option<u64>,
}

impl Sort {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn order(&self) -> Order {
        self.order
    }

    #[must_use]
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// ` ORDER BY a, b DESC[ LIMIT n]`, or nothing when no columns were given.
    #[must_use]
    pub fn compile(&self) -> QueryNode {
        if self.columns.is_empty() {
            return QueryNode::default();
        }
        let mut sql = format!(
            " ORDER BY {} {}",
            self.columns.join(", "),
            self.order.sql()
        );
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        QueryNode::new(sql)
    }
}

/// Queries that accept `ORDER BY` and `LIMIT`.
pub trait Sortable: Sized + Clone {
    #[doc(hidden)]
    fn sort_spec(&self) -> &Sort;

    #[doc(hidden)]
    #[must_use]
    fn with_sort(&self, sort: Sort) -> Self;

    /// Order by `columns`, descending unless `asc` is called afterwards.
    #[must_use]
    fn sort<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sort = Sort {
            columns: columns.into_iter().map(Into::into).collect(),
            ..self.sort_spec().clone()
        };
        self.with_sort(sort)
    }

    /// # Errors
    /// `SqliteWrapperError::Sort` if `sort` was not called first.
    fn asc(&self) -> Result<Self, SqliteWrapperError> {
        self.reorder(Order::Asc)
    }

    /// # Errors
    /// `SqliteWrapperError::Sort` if `sort` was not called first.
    fn desc(&self) -> Result<Self, SqliteWrapperError> {
        self.reorder(Order::Desc)
    }

    /// # Errors
    /// `SqliteWrapperError::Sort` if `sort` was not called first.
    fn limit(&self, rows: u64) -> Result<Self, SqliteWrapperError> {
        let current = sorted(self.sort_spec())?;
        Ok(self.with_sort(Sort {
            limit: Some(rows),
            ..current.clone()
        }))
    }

    #[doc(hidden)]
    fn reorder(&self, order: Order) -> Result<Self, SqliteWrapperError> {
        let current = sorted(self.sort_spec())?;
        Ok(self.with_sort(Sort {
            order,
            ..current.clone()
        }))
    }
}

fn sorted(sort: &Sort) -> Result<&Sort, SqliteWrapperError> {
    if sort.is_empty() {
        Err(SqliteWrapperError::Sort(
            "no reference has been provided (use .sort first)".into(),
        ))
    } else {
        Ok(sort)
    }
}
