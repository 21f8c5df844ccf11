//! Supported SQL dialects and the statement renderer.
//!
//! The renderer implements sea-query's backend traits with the two knobs
//! that actually vary across the supported vendors: identifier quoting and
//! placeholder style. Statement text and its parameter list are emitted in
//! one traversal, which is what keeps parameter order aligned with
//! placeholder order.

use sea_query::backend::{
    EscapeBuilder, OperLeftAssocDecider, PrecedenceDecider, QuotedBuilder, TableRefBuilder,
};
use sea_query::prepare::SqlWriter;
use sea_query::{BinOper, Oper, Quote, SimpleExpr, SubQueryStatement, Value};

/// The closed set of supported SQL dialects. Selected once at wiring time;
/// every statement a repository emits renders through the same dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL / MariaDB: backtick quoting, `?` placeholders.
    MySql,
    /// PostgreSQL: double-quote quoting, numbered `$n` placeholders.
    Postgres,
    /// SQLite: double-quote quoting, `?` placeholders.
    Sqlite,
}

impl Dialect {
    pub(crate) fn renderer(self) -> Renderer {
        match self {
            Self::MySql => Renderer { quote: Quote::new(b'`'), placeholder: "?", numbered: false },
            Self::Postgres => {
                Renderer { quote: Quote::new(b'"'), placeholder: "$", numbered: true }
            }
            Self::Sqlite => Renderer { quote: Quote::new(b'"'), placeholder: "?", numbered: false },
        }
    }
}

pub(crate) struct Renderer {
    quote: Quote,
    placeholder: &'static str,
    numbered: bool,
}

impl QuotedBuilder for Renderer {
    fn quote(&self) -> Quote {
        self.quote
    }
}

impl EscapeBuilder for Renderer {}

impl TableRefBuilder for Renderer {}

impl OperLeftAssocDecider for Renderer {
    fn well_known_left_associative(&self, op: &BinOper) -> bool {
        matches!(
            op,
            BinOper::And | BinOper::Or | BinOper::Add | BinOper::Sub | BinOper::Mul | BinOper::Mod
        )
    }
}

impl PrecedenceDecider for Renderer {
    fn inner_expr_well_known_greater_precedence(
        &self, _inner: &SimpleExpr, _outer_oper: &Oper,
    ) -> bool {
        // Conservative approach that forces parentheses
        false
    }
}

impl sea_query::backend::QueryBuilder for Renderer {
    fn prepare_query_statement(&self, query: &SubQueryStatement, sql: &mut dyn SqlWriter) {
        match query {
            SubQueryStatement::SelectStatement(s) => self.prepare_select_statement(s, sql),
            SubQueryStatement::InsertStatement(s) => self.prepare_insert_statement(s, sql),
            SubQueryStatement::UpdateStatement(s) => self.prepare_update_statement(s, sql),
            SubQueryStatement::DeleteStatement(s) => self.prepare_delete_statement(s, sql),
            SubQueryStatement::WithStatement(s) => self.prepare_with_query(s, sql),
        }
    }

    fn prepare_value(&self, value: &Value, sql: &mut dyn SqlWriter) {
        sql.push_param(value.clone(), self);
    }

    fn placeholder(&self) -> (&str, bool) {
        (self.placeholder, self.numbered)
    }
}
