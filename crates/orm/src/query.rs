//! Composable filter, ordering, and patch specification.
//!
//! A [`Query`] is a pure description: compiling it is deterministic, so the
//! same tree always yields byte-identical SQL and identical parameter
//! ordering. Shapes the dialects cannot express fail at compile time, before
//! any statement executes.

use sea_query::{Alias, Expr, Order, SimpleExpr, Value};

use crate::error::{Error, Result};

/// A predicate tree over entity columns.
///
/// Values are stored as statement parameters, never interpolated into SQL
/// text. Column names are compile-time constants.
#[derive(Clone, Debug)]
pub enum Filter {
    /// column = value
    Eq(&'static str, Value),
    /// column <> value
    Ne(&'static str, Value),
    /// column > value
    Gt(&'static str, Value),
    /// column >= value
    Gte(&'static str, Value),
    /// column < value
    Lt(&'static str, Value),
    /// column <= value
    Lte(&'static str, Value),
    /// column IN (values)
    In(&'static str, Vec<Value>),
    /// column LIKE pattern
    Like(&'static str, String),
    /// Logical AND of multiple filters
    And(Vec<Self>),
    /// Logical OR of multiple filters
    Or(Vec<Self>),
}

impl Filter {
    /// Creates an equality filter (column = value).
    #[must_use]
    pub fn eq(col: &'static str, val: impl Into<Value>) -> Self {
        Self::Eq(col, val.into())
    }

    /// Creates an inequality filter (column <> value).
    #[must_use]
    pub fn ne(col: &'static str, val: impl Into<Value>) -> Self {
        Self::Ne(col, val.into())
    }

    /// Creates a greater-than filter (column > value).
    #[must_use]
    pub fn gt(col: &'static str, val: impl Into<Value>) -> Self {
        Self::Gt(col, val.into())
    }

    /// Creates a greater-than-or-equal filter (column >= value).
    #[must_use]
    pub fn gte(col: &'static str, val: impl Into<Value>) -> Self {
        Self::Gte(col, val.into())
    }

    /// Creates a less-than filter (column < value).
    #[must_use]
    pub fn lt(col: &'static str, val: impl Into<Value>) -> Self {
        Self::Lt(col, val.into())
    }

    /// Creates a less-than-or-equal filter (column <= value).
    #[must_use]
    pub fn lte(col: &'static str, val: impl Into<Value>) -> Self {
        Self::Lte(col, val.into())
    }

    /// Creates an IN filter (column IN (values)).
    #[must_use]
    pub fn r#in(col: &'static str, vals: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::In(col, vals.into_iter().map(Into::into).collect())
    }

    /// Creates a LIKE filter with pattern matching.
    #[must_use]
    pub fn like(col: &'static str, pattern: impl Into<String>) -> Self {
        Self::Like(col, pattern.into())
    }

    /// Creates a logical AND over filters.
    #[must_use]
    pub fn and(filters: Vec<Self>) -> Self {
        Self::And(filters)
    }

    /// Creates a logical OR over filters.
    #[must_use]
    pub fn or(filters: Vec<Self>) -> Self {
        Self::Or(filters)
    }

    /// Compile the tree into an expression. Deterministic; invalid shapes
    /// (empty IN lists, empty groups) fail here, before any SQL executes.
    pub(crate) fn to_expr(&self) -> Result<SimpleExpr> {
        let expr = match self {
            Self::Eq(col, val) => Expr::col(Alias::new(*col)).eq(val.clone()),
            Self::Ne(col, val) => Expr::col(Alias::new(*col)).ne(val.clone()),
            Self::Gt(col, val) => Expr::col(Alias::new(*col)).gt(val.clone()),
            Self::Gte(col, val) => Expr::col(Alias::new(*col)).gte(val.clone()),
            Self::Lt(col, val) => Expr::col(Alias::new(*col)).lt(val.clone()),
            Self::Lte(col, val) => Expr::col(Alias::new(*col)).lte(val.clone()),
            Self::In(col, vals) => {
                if vals.is_empty() {
                    return Err(Error::Query(format!("IN filter on '{col}' has no values")));
                }
                Expr::col(Alias::new(*col)).is_in(vals.clone())
            }
            Self::Like(col, pattern) => Expr::col(Alias::new(*col)).like(pattern.clone()),
            Self::And(filters) => fold_group(Self::to_exprs(filters, "AND")?, SimpleExpr::and),
            Self::Or(filters) => fold_group(Self::to_exprs(filters, "OR")?, SimpleExpr::or),
        };
        Ok(expr)
    }

    fn to_exprs(filters: &[Self], label: &str) -> Result<Vec<SimpleExpr>> {
        if filters.is_empty() {
            return Err(Error::Query(format!("{label} group has no conditions")));
        }
        filters.iter().map(Self::to_expr).collect()
    }
}

/// Fold a non-empty expression list with the given combinator.
fn fold_group(exprs: Vec<SimpleExpr>, combine: fn(SimpleExpr, SimpleExpr) -> SimpleExpr) -> SimpleExpr {
    let mut exprs = exprs.into_iter();
    let Some(first) = exprs.next() else {
        // to_exprs rejects empty groups
        return SimpleExpr::Value(Value::Bool(Some(true)));
    };
    exprs.fold(first, combine)
}

/// A composed query: filter predicates (ANDed), optional ordering, optional
/// limit/offset, and an optional SET list for patch operations.
#[derive(Clone, Debug, Default)]
pub struct Query {
    filters: Vec<Filter>,
    order: Vec<(&'static str, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    updates: Vec<(&'static str, Value)>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter; multiple filters combine with AND.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds ascending ordering by a column.
    #[must_use]
    pub fn order_by(mut self, col: &'static str) -> Self {
        self.order.push((col, Order::Asc));
        self
    }

    /// Adds descending ordering by a column.
    #[must_use]
    pub fn order_by_desc(mut self, col: &'static str) -> Self {
        self.order.push((col, Order::Desc));
        self
    }

    /// Bounds the number of rows returned.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips rows before returning.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds a column assignment for patch operations.
    #[must_use]
    pub fn set(mut self, col: &'static str, value: impl Into<Value>) -> Self {
        self.updates.push((col, value.into()));
        self
    }

    /// Compile the filters into one ANDed expression, `None` when the query
    /// has no conditions.
    pub(crate) fn filter_expr(&self) -> Result<Option<SimpleExpr>> {
        if self.filters.is_empty() {
            return Ok(None);
        }
        let exprs = self.filters.iter().map(Filter::to_expr).collect::<Result<Vec<_>>>()?;
        Ok(Some(fold_group(exprs, SimpleExpr::and)))
    }

    /// The filters, as composed.
    pub(crate) fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub(crate) fn order(&self) -> &[(&'static str, Order)] {
        &self.order
    }

    pub(crate) const fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub(crate) const fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// The SET list, required non-empty for patch compilation.
    pub(crate) fn required_updates(&self) -> Result<&[(&'static str, Value)]> {
        if self.updates.is_empty() {
            return Err(Error::Query("patch query has an empty SET list".to_string()));
        }
        Ok(&self.updates)
    }
}
