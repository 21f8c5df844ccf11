//! Parameterized statement synthesis from entity metadata.
//!
//! The builder knows tables and columns, never entity instances: whole-row
//! operations receive an already-encoded value list, query-driven operations
//! receive a [`Query`] tree. Nothing is cached; every call recomputes the
//! statement from metadata plus current arguments, so vendor or schema
//! changes take effect immediately.

use sea_query::{Alias, Expr, Order, SimpleExpr, Value, Values};
use tabula_sql::DbValue;

use crate::convert::Converter;
use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::meta::Meta;
use crate::query::Query;

/// One parameterized statement: SQL text plus its ordered parameter list.
/// Single-use; parameter order always matches placeholder order because both
/// are emitted by one rendering pass.
#[derive(Clone, Debug)]
pub struct Statement {
    /// The statement text with dialect placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<DbValue>,
}

/// Statement synthesis for one dialect.
#[derive(Clone, Copy, Debug)]
pub struct Syntax {
    dialect: Dialect,
    converter: Converter,
}

impl Syntax {
    /// A syntax builder for the given dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect, converter: Converter::new(dialect) }
    }

    /// The dialect statements render in.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn finish(&self, table: &str, built: (String, Values)) -> Result<Statement> {
        let (sql, values) = built;
        let params = self.converter.to_params(values)?;

        tracing::debug!(table, sql = %sql, param_count = params.len(), "generated statement");

        Ok(Statement { sql, params })
    }

    /// Convert loose parameter values (stored-procedure arguments) into
    /// boundary values for this dialect.
    pub(crate) fn params(&self, values: Vec<Value>) -> Result<Vec<DbValue>> {
        self.converter.to_params(values)
    }

    fn lookup(row: &[(&'static str, Value)], name: &'static str) -> Result<Value> {
        row.iter()
            .find(|(col, _)| *col == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| Error::Schema(format!("no value provided for column '{name}'")))
    }

    fn select_statement<T: Entity>(meta: &Meta<T>) -> sea_query::SelectStatement {
        let mut statement = sea_query::Query::select();
        statement.columns(meta.fields().iter().map(|spec| Alias::new(spec.name)));
        statement.from(Alias::new(meta.table()));
        statement
    }

    fn count_statement<T: Entity>(meta: &Meta<T>) -> sea_query::SelectStatement {
        let mut statement = sea_query::Query::select();
        statement.expr(Expr::cust("COUNT(*)"));
        statement.from(Alias::new(meta.table()));
        statement
    }

    fn insert_statement<T: Entity>(
        meta: &Meta<T>, row: &[(&'static str, Value)],
    ) -> Result<sea_query::InsertStatement> {
        let mut statement = sea_query::Query::insert();
        statement.into_table(Alias::new(meta.table()));

        let mut columns = Vec::new();
        let mut values = Vec::new();
        for spec in meta.insert_fields() {
            columns.push(Alias::new(spec.name));
            values.push(SimpleExpr::Value(Self::lookup(row, spec.name)?));
        }
        statement.columns(columns);
        statement.values_panic(values);

        Ok(statement)
    }

    fn id_filter<T: Entity>(meta: &Meta<T>, id: Value) -> SimpleExpr {
        Expr::col(Alias::new(meta.id().name())).eq(id)
    }

    /// INSERT with columns in declared field order, identity excluded when
    /// the backend generates it.
    ///
    /// # Errors
    ///
    /// Returns an error when the row misses a declared column or a value
    /// cannot cross the boundary.
    pub fn insert<T: Entity>(
        &self, meta: &Meta<T>, row: &[(&'static str, Value)],
    ) -> Result<Statement> {
        let statement = Self::insert_statement(meta, row)?;
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// INSERT returning the generated identity column as a result row, for
    /// dialects that report identities that way.
    ///
    /// # Errors
    ///
    /// Returns an error when the row misses a declared column or a value
    /// cannot cross the boundary.
    pub fn insert_returning<T: Entity>(
        &self, meta: &Meta<T>, row: &[(&'static str, Value)],
    ) -> Result<Statement> {
        let mut statement = Self::insert_statement(meta, row)?;
        statement.returning_col(Alias::new(meta.id().name()));
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// UPDATE of every non-identity field, keyed by identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the row misses a declared column or a value
    /// cannot cross the boundary.
    pub fn update<T: Entity>(
        &self, meta: &Meta<T>, id: Value, row: &[(&'static str, Value)],
    ) -> Result<Statement> {
        let mut statement = sea_query::Query::update();
        statement.table(Alias::new(meta.table()));
        for spec in meta.value_fields() {
            statement.value(Alias::new(spec.name), Self::lookup(row, spec.name)?);
        }
        statement.and_where(Self::id_filter(meta, id));
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// SELECT one row by identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the identity value cannot cross the boundary.
    pub fn select_by_id<T: Entity>(&self, meta: &Meta<T>, id: Value) -> Result<Statement> {
        let mut statement = Self::select_statement(meta);
        statement.and_where(Self::id_filter(meta, id));
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// SELECT rows whose identity is in the given set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] for an empty identity set.
    pub fn select_by_ids<T: Entity>(&self, meta: &Meta<T>, ids: Vec<Value>) -> Result<Statement> {
        if ids.is_empty() {
            return Err(Error::Query("identity set is empty".to_string()));
        }
        let mut statement = Self::select_statement(meta);
        statement.and_where(Expr::col(Alias::new(meta.id().name())).is_in(ids));
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// SELECT every row.
    ///
    /// # Errors
    ///
    /// Returns an error when rendering fails to convert a value.
    pub fn select_all<T: Entity>(&self, meta: &Meta<T>) -> Result<Statement> {
        let statement = Self::select_statement(meta);
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// SELECT COUNT(*) over the table.
    ///
    /// # Errors
    ///
    /// Returns an error when rendering fails to convert a value.
    pub fn count<T: Entity>(&self, meta: &Meta<T>) -> Result<Statement> {
        let statement = Self::count_statement(meta);
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// SELECT a bounded sequence ordered by identity.
    ///
    /// # Errors
    ///
    /// Returns an error when rendering fails to convert a value.
    pub fn take<T: Entity>(&self, meta: &Meta<T>, count: u64, desc: bool) -> Result<Statement> {
        let mut statement = Self::select_statement(meta);
        let order = if desc { Order::Desc } else { Order::Asc };
        statement.order_by(Alias::new(meta.id().name()), order);
        statement.limit(count);
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// DELETE one row by identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the identity value cannot cross the boundary.
    pub fn delete_by_id<T: Entity>(&self, meta: &Meta<T>, id: Value) -> Result<Statement> {
        let mut statement = sea_query::Query::delete();
        statement.from_table(Alias::new(meta.table()));
        statement.and_where(Self::id_filter(meta, id));
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// DELETE rows whose identity is in the given set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] for an empty identity set.
    pub fn delete_by_ids<T: Entity>(&self, meta: &Meta<T>, ids: Vec<Value>) -> Result<Statement> {
        if ids.is_empty() {
            return Err(Error::Query("identity set is empty".to_string()));
        }
        let mut statement = sea_query::Query::delete();
        statement.from_table(Alias::new(meta.table()));
        statement.and_where(Expr::col(Alias::new(meta.id().name())).is_in(ids));
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// DELETE every row.
    ///
    /// # Errors
    ///
    /// Returns an error when rendering fails to convert a value.
    pub fn delete_all<T: Entity>(&self, meta: &Meta<T>) -> Result<Statement> {
        let mut statement = sea_query::Query::delete();
        statement.from_table(Alias::new(meta.table()));
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// SELECT shaped by a query: filter, ordering, limit, offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when the query tree cannot compile.
    pub fn select_where<T: Entity>(&self, meta: &Meta<T>, query: &Query) -> Result<Statement> {
        let mut statement = Self::select_statement(meta);
        if let Some(expr) = query.filter_expr()? {
            statement.and_where(expr);
        }
        for (col, order) in query.order() {
            statement.order_by(Alias::new(*col), order.clone());
        }
        if let Some(limit) = query.limit_value() {
            statement.limit(limit);
        }
        if let Some(offset) = query.offset_value() {
            statement.offset(offset);
        }
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// SELECT COUNT(*) shaped by a query's filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when the query tree cannot compile.
    pub fn count_where<T: Entity>(&self, meta: &Meta<T>, query: &Query) -> Result<Statement> {
        let mut statement = Self::count_statement(meta);
        if let Some(expr) = query.filter_expr()? {
            statement.and_where(expr);
        }
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// DELETE shaped by a query's filter. A filterless delete is refused;
    /// dropping the whole table goes through the explicit delete-all path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when the query has no conditions or cannot
    /// compile.
    pub fn delete_where<T: Entity>(&self, meta: &Meta<T>, query: &Query) -> Result<Statement> {
        if !query.has_filters() {
            return Err(Error::Query("delete query has no filter conditions".to_string()));
        }
        let mut statement = sea_query::Query::delete();
        statement.from_table(Alias::new(meta.table()));
        if let Some(expr) = query.filter_expr()? {
            statement.and_where(expr);
        }
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }

    /// UPDATE with SET pairs and filter taken from a query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] when the SET list is empty or the query
    /// cannot compile.
    pub fn update_where<T: Entity>(&self, meta: &Meta<T>, query: &Query) -> Result<Statement> {
        let updates = query.required_updates()?;

        let mut statement = sea_query::Query::update();
        statement.table(Alias::new(meta.table()));
        for (col, value) in updates {
            statement.value(Alias::new(*col), value.clone());
        }
        if let Some(expr) = query.filter_expr()? {
            statement.and_where(expr);
        }
        self.finish(meta.table(), statement.build(self.dialect.renderer()))
    }
}
