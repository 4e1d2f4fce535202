use crate::db::Database;
use crate::engine::{Completion, ReadShape};
use crate::error::SqliteWrapperError;
use crate::results::Fetched;

use super::filter::{Filter, Filterable};
use super::join::{JoinKind, JoinSpec};
use super::sort::{Sort, Sortable};
use super::statement::QueryNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetMode {
    /// Fetch one row.
    First,
    /// Fetch every row.
    All,
}

/// `SELECT items FROM table` plus joins, filter, and sort.
///
/// Requesting exactly one named column collapses the result to scalars: a
/// single [`Fetched::Value`] in first mode, [`Fetched::Values`] in all mode.
#[derive(Debug, Clone)]
pub struct GetRow<'db> {
    db: &'db Database,
    table: String,
    mode: GetMode,
    items: Vec<String>,
    joins: Vec<JoinSpec>,
    filter: Filter,
    sort: Sort,
}

impl<'db> GetRow<'db> {
    pub(crate) fn new<I, S>(db: &'db Database, table: &str, mode: GetMode, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            items.push("*".to_string());
        }
        Self {
            db,
            table: table.to_string(),
            mode,
            items,
            joins: Vec::new(),
            filter: Filter::default(),
            sort: Sort::default(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> GetMode {
        self.mode
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Select more columns. Ignored while selecting `*`.
    #[must_use]
    pub fn and_get<I, S>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        if !self.selects_everything() {
            next.items.extend(items.into_iter().map(Into::into));
        }
        next
    }

    /// Join another table. See [`JoinSpec::resolve`] for how omitted columns are inferred.
    ///
    /// # Errors
    /// `SqliteWrapperError::Instance` if either side cannot be resolved.
    pub fn join(
        &self,
        kind: JoinKind,
        left: Option<&str>,
        right: Option<&str>,
    ) -> Result<Self, SqliteWrapperError> {
        let spec = JoinSpec::resolve(kind, &self.table, left, right, self.db)?;
        let mut next = self.clone();
        next.joins.push(spec);
        Ok(next)
    }

    /// # Errors
    /// `SqliteWrapperError::Instance` if either side cannot be resolved.
    pub fn left_join(&self, left: Option<&str>, right: Option<&str>) -> Result<Self, SqliteWrapperError> {
        self.join(JoinKind::Left, left, right)
    }

    /// # Errors
    /// `SqliteWrapperError::Instance` if either side cannot be resolved.
    pub fn inner_join(&self, left: Option<&str>, right: Option<&str>) -> Result<Self, SqliteWrapperError> {
        self.join(JoinKind::Inner, left, right)
    }

    /// # Errors
    /// `SqliteWrapperError::Instance` if either side cannot be resolved.
    pub fn right_join(&self, left: Option<&str>, right: Option<&str>) -> Result<Self, SqliteWrapperError> {
        self.join(JoinKind::Right, left, right)
    }

    /// # Errors
    /// `SqliteWrapperError::Instance` if either side cannot be resolved.
    pub fn full_join(&self, left: Option<&str>, right: Option<&str>) -> Result<Self, SqliteWrapperError> {
        self.join(JoinKind::Full, left, right)
    }

    fn selects_everything(&self) -> bool {
        self.items.iter().any(|item| item == "*")
    }

    fn simplify(&self) -> bool {
        self.items.len() == 1 && !self.selects_everything()
    }

    fn shape(&self) -> ReadShape {
        let simplify = self.simplify();
        match self.mode {
            GetMode::First => ReadShape::First { simplify },
            GetMode::All => ReadShape::All { simplify },
        }
    }

    #[must_use]
    pub fn query(&self) -> QueryNode {
        let mut node = QueryNode::new(format!(
            "SELECT {} FROM {}",
            self.items.join(", "),
            self.table
        ));
        for join in &self.joins {
            node.append(join.compile(&self.table));
        }
        node.append(self.filter.compile());
        node.append(self.sort.compile());
        node
    }

    /// Reads always block until their rows are available.
    ///
    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run(&self) -> Result<Fetched, SqliteWrapperError> {
        Ok(self.db.read(self.shape(), self.query())?.into_fetched())
    }

    /// Same as [`GetRow::run`]; a read cannot be detached.
    ///
    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub fn run_with(&self, _completion: Completion) -> Result<Fetched, SqliteWrapperError> {
        self.run()
    }

    /// # Errors
    /// Returns `SqliteWrapperError` if the database is closed or the statement fails.
    pub async fn run_async(&self) -> Result<Fetched, SqliteWrapperError> {
        Ok(self
            .db
            .read_async(self.shape(), self.query())
            .await?
            .into_fetched())
    }
}

impl Filterable for GetRow<'_> {
    fn filter(&self) -> &Filter {
        &self.filter
    }

    fn with_filter(&self, filter: Filter) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }
}

impl Sortable for GetRow<'_> {
    fn sort_spec(&self) -> &Sort {
        &self.sort
    }

    fn with_sort(&self, sort: Sort) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }
}
