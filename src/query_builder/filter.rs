use crate::error::SqliteWrapperError;
use crate::types::Value;

use super::statement::QueryNode;

/// Comparison operators available in a `WHERE` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Like,
    NotLike,
    Is,
    IsNot,
    In,
    NotIn,
}

impl Operator {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::GtEq => ">=",
            Operator::LtEq => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    #[must_use]
    pub fn takes_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

/// One comparison. The first clause of a filter carries no conjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    column: String,
    operator: Operator,
    values: Vec<Value>,
    conjunction: Option<Conjunction>,
}

impl FilterClause {
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn conjunction(&self) -> Option<Conjunction> {
        self.conjunction
    }

    /// ` [AND|OR] column OP ?` or ` column IN (?, ?, ...)`.
    #[must_use]
    pub fn compile(&self) -> QueryNode {
        let mut sql = String::new();
        if let Some(conjunction) = self.conjunction {
            sql.push(' ');
            sql.push_str(conjunction.sql());
        }
        sql.push(' ');
        sql.push_str(&self.column);
        sql.push(' ');
        sql.push_str(self.operator.sql());
        if self.operator.takes_list() {
            sql.push_str(" (");
            sql.push_str(&vec!["?"; self.values.len()].join(", "));
            sql.push(')');
        } else {
            sql.push_str(" ?");
        }
        QueryNode::with_inputs(sql, self.values.clone())
    }
}

/// An ordered conjunction of clauses; compiles to ` WHERE ...` or nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<FilterClause>,
}

impl Filter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    #[must_use]
    pub(crate) fn with_clause(&self, clause: FilterClause) -> Filter {
        let mut clauses = self.clauses.clone();
        clauses.push(clause);
        Filter { clauses }
    }

    #[must_use]
    pub fn compile(&self) -> QueryNode {
        if self.clauses.is_empty() {
            return QueryNode::default();
        }
        let mut node = QueryNode::new(" WHERE");
        for clause in &self.clauses {
            node.append(clause.compile());
        }
        node
    }
}

/// Queries that accept a `WHERE` clause.
///
/// Every method returns a new query; the receiver is never modified.
pub trait Filterable: Sized + Clone {
    #[doc(hidden)]
    fn filter(&self) -> &Filter;

    #[doc(hidden)]
    #[must_use]
    fn with_filter(&self, filter: Filter) -> Self;

    /// Start the predicate on `column`.
    ///
    /// # Errors
    /// `SqliteWrapperError::Logic` if the query is already filtered; use `and`/`or`.
    fn where_(&self, column: &str) -> Result<Condition<Self>, SqliteWrapperError> {
        if !self.filter().is_empty() {
            return Err(SqliteWrapperError::Logic("already performing logic".into()));
        }
        Ok(Condition::new(self.clone(), column, None))
    }

    /// Add a clause that must also hold.
    ///
    /// # Errors
    /// `SqliteWrapperError::Logic` if there is no clause to chain from.
    fn and(&self, column: &str) -> Result<Condition<Self>, SqliteWrapperError> {
        self.chain(column, Conjunction::And)
    }

    /// Add an alternative clause.
    ///
    /// # Errors
    /// `SqliteWrapperError::Logic` if there is no clause to chain from.
    fn or(&self, column: &str) -> Result<Condition<Self>, SqliteWrapperError> {
        self.chain(column, Conjunction::Or)
    }

    #[doc(hidden)]
    fn chain(
        &self,
        column: &str,
        conjunction: Conjunction,
    ) -> Result<Condition<Self>, SqliteWrapperError> {
        if self.filter().is_empty() {
            return Err(SqliteWrapperError::Logic(
                "no item to perform logic on".into(),
            ));
        }
        Ok(Condition::new(self.clone(), column, Some(conjunction)))
    }
}

/// A pending comparison on one column; completing it yields the filtered query.
#[derive(Debug, Clone)]
pub struct Condition<Q> {
    query: Q,
    column: String,
    conjunction: Option<Conjunction>,
}

impl<Q: Filterable> Condition<Q> {
    fn new(query: Q, column: &str, conjunction: Option<Conjunction>) -> Self {
        Self {
            query,
            column: column.to_string(),
            conjunction,
        }
    }

    fn push(self, operator: Operator, values: Vec<Value>) -> Result<Q, SqliteWrapperError> {
        let clause = FilterClause {
            column: self.column,
            operator,
            values,
            conjunction: self.conjunction,
        };
        let filter = self.query.filter().with_clause(clause);
        Ok(self.query.with_filter(filter))
    }

    fn push_number(self, operator: Operator, value: Value) -> Result<Q, SqliteWrapperError> {
        if !value.is_numeric() {
            return Err(SqliteWrapperError::type_error(
                "comparison number must be an integer or float",
            ));
        }
        self.push(operator, vec![value])
    }

    fn push_pattern(
        self,
        operator: Operator,
        value: Value,
        shape: impl FnOnce(&str) -> String,
    ) -> Result<Q, SqliteWrapperError> {
        let pattern = match &value {
            Value::Text(text) => shape(text),
            Value::Blob(bytes) => shape(&String::from_utf8_lossy(bytes)),
            _ => {
                return Err(SqliteWrapperError::type_error(
                    "comparison item must be a string",
                ));
            }
        };
        self.push(operator, vec![Value::Text(pattern)])
    }

    /// # Errors
    /// Never fails; returns `Result` for uniform chaining.
    pub fn eq(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push(Operator::Eq, vec![value.into()])
    }

    /// # Errors
    /// Never fails; returns `Result` for uniform chaining.
    pub fn neq(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push(Operator::Neq, vec![value.into()])
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is numeric.
    pub fn gt(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_number(Operator::Gt, value.into())
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is numeric.
    pub fn lt(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_number(Operator::Lt, value.into())
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is numeric.
    pub fn gteq(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_number(Operator::GtEq, value.into())
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is numeric.
    pub fn lteq(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_number(Operator::LtEq, value.into())
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn like(self, pattern: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::Like, pattern.into(), str::to_string)
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn not_like(self, pattern: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::NotLike, pattern.into(), str::to_string)
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn contains(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::Like, value.into(), |v| format!("%{v}%"))
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn not_contains(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::NotLike, value.into(), |v| format!("%{v}%"))
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn starts_with(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::Like, value.into(), |v| format!("{v}%"))
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn not_starts_with(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::NotLike, value.into(), |v| format!("{v}%"))
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn ends_with(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::Like, value.into(), |v| format!("%{v}"))
    }

    /// # Errors
    /// `SqliteWrapperError::Type` unless the value is text or a blob.
    pub fn not_ends_with(self, value: impl Into<Value>) -> Result<Q, SqliteWrapperError> {
        self.push_pattern(Operator::NotLike, value.into(), |v| format!("%{v}"))
    }

    /// # Errors
    /// Never fails; returns `Result` for uniform chaining.
    pub fn is_null(self) -> Result<Q, SqliteWrapperError> {
        self.push(Operator::Is, vec![Value::Null])
    }

    /// # Errors
    /// Never fails; returns `Result` for uniform chaining.
    pub fn is_not_null(self) -> Result<Q, SqliteWrapperError> {
        self.push(Operator::IsNot, vec![Value::Null])
    }

    /// # Errors
    /// Never fails; returns `Result` for uniform chaining.
    pub fn is_in<I, V>(self, values: I) -> Result<Q, SqliteWrapperError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(Operator::In, values.into_iter().map(Into::into).collect())
    }

    /// # Errors
    /// Never fails; returns `Result` for uniform chaining.
    pub fn not_in<I, V>(self, values: I) -> Result<Q, SqliteWrapperError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(Operator::NotIn, values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Probe {
        filter: Filter,
    }

    impl Filterable for Probe {
        fn filter(&self) -> &Filter {
            &self.filter
        }

        fn with_filter(&self, filter: Filter) -> Self {
            Probe { filter }
        }
    }

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn single_operators_bind_one_placeholder() {
        let base = Probe::default();
        let built = vec![
            base.where_("a").unwrap().eq(1).unwrap(),
            base.where_("a").unwrap().neq("x").unwrap(),
            base.where_("a").unwrap().gt(1).unwrap(),
            base.where_("a").unwrap().lt(1.5).unwrap(),
            base.where_("a").unwrap().gteq(1).unwrap(),
            base.where_("a").unwrap().lteq(1).unwrap(),
            base.where_("a").unwrap().like("x%").unwrap(),
            base.where_("a").unwrap().not_like("x%").unwrap(),
            base.where_("a").unwrap().is_null().unwrap(),
            base.where_("a").unwrap().is_not_null().unwrap(),
        ];
        for probe in built {
            let node = probe.filter.compile();
            assert_eq!(placeholders(node.sql()), 1, "{}", node.sql());
            assert_eq!(node.inputs().len(), 1);
        }
    }

    #[test]
    fn in_lists_expand_per_value() {
        let node = Probe::default()
            .where_("id")
            .unwrap()
            .is_in([3, 1, 2])
            .unwrap()
            .filter
            .compile();
        assert_eq!(node.sql(), " WHERE id IN (?, ?, ?)");
        assert_eq!(
            node.inputs(),
            &[Value::Integer(3), Value::Integer(1), Value::Integer(2)]
        );

        let negated = Probe::default()
            .where_("id")
            .unwrap()
            .not_in(vec!["a", "b"])
            .unwrap()
            .filter
            .compile();
        assert_eq!(negated.sql(), " WHERE id NOT IN (?, ?)");
    }

    #[test]
    fn clauses_join_with_conjunctions() {
        let probe = Probe::default()
            .where_("name")
            .unwrap()
            .eq("b")
            .unwrap()
            .and("age")
            .unwrap()
            .gteq(18)
            .unwrap()
            .or("name")
            .unwrap()
            .starts_with("ad")
            .unwrap();
        let node = probe.filter.compile();
        assert_eq!(
            node.sql(),
            " WHERE name = ? AND age >= ? OR name LIKE ?"
        );
        assert_eq!(
            node.inputs(),
            &[Value::from("b"), Value::from(18), Value::from("ad%")]
        );
        assert_eq!(probe.filter.clauses()[0].conjunction(), None);
    }

    #[test]
    fn chaining_rules() {
        let base = Probe::default();
        assert!(matches!(base.and("a"), Err(SqliteWrapperError::Logic(_))));
        assert!(matches!(base.or("a"), Err(SqliteWrapperError::Logic(_))));
        let filtered = base.where_("a").unwrap().eq(1).unwrap();
        assert!(matches!(filtered.where_("b"), Err(SqliteWrapperError::Logic(_))));
        // the base query is untouched by the derived one
        assert!(base.filter.is_empty());
    }

    #[test]
    fn typed_comparisons_reject_wrong_values() {
        let base = Probe::default();
        assert!(matches!(
            base.where_("a").unwrap().gt("ten"),
            Err(SqliteWrapperError::Type(_))
        ));
        assert!(matches!(
            base.where_("a").unwrap().contains(10),
            Err(SqliteWrapperError::Type(_))
        ));
        let contains = base.where_("a").unwrap().contains("mid").unwrap();
        assert_eq!(contains.filter.clauses()[0].values(), &[Value::from("%mid%")]);
        let ends = base.where_("a").unwrap().not_ends_with("z").unwrap();
        assert_eq!(ends.filter.clauses()[0].operator(), Operator::NotLike);
        assert_eq!(ends.filter.clauses()[0].values(), &[Value::from("%z")]);
    }
}
