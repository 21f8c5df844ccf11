//! Statement-synthesis tests across dialects.
//!
//! These exercise the public API the way wiring code does: metadata plus a
//! mapper-encoded row in, parameterized SQL out.

#![allow(missing_docs)]

mod common;

use common::{Setting, assert_sql_contains, setting_meta, user_meta};
use tabula_orm::{DbValue, Dialect, Mapper, Syntax};

fn encoded_ann(dialect: Dialect) -> Vec<(&'static str, tabula_orm::Value)> {
    Mapper::new(dialect).encode(&user_meta(), &common::ann()).unwrap()
}

#[test]
fn insert_excludes_generated_identity() {
    let syntax = Syntax::new(Dialect::Sqlite);
    let stmt = syntax.insert(&user_meta(), &encoded_ann(Dialect::Sqlite)).unwrap();

    assert_sql_contains(&stmt.sql, &["INSERT INTO users (name, age, active) VALUES (?, ?, ?)"]);
    assert_eq!(stmt.params.len(), 3);
    assert!(matches!(&stmt.params[0], DbValue::Text(Some(name)) if name == "Ann"));
    assert!(matches!(stmt.params[1], DbValue::Int(Some(30))));
    // SQLite stores booleans as integers.
    assert!(matches!(stmt.params[2], DbValue::Int(Some(1))));
}

#[test]
fn insert_includes_assigned_identity() {
    let syntax = Syntax::new(Dialect::Sqlite);
    let setting = Setting { code: "theme".to_string(), value: "dark".to_string() };
    let row = Mapper::new(Dialect::Sqlite).encode(&setting_meta(), &setting).unwrap();
    let stmt = syntax.insert(&setting_meta(), &row).unwrap();

    assert_sql_contains(&stmt.sql, &["INSERT INTO settings (code, value) VALUES (?, ?)"]);
    assert_eq!(stmt.params.len(), 2);
}

#[test]
fn postgres_numbers_its_placeholders() {
    let syntax = Syntax::new(Dialect::Postgres);
    let stmt = syntax.insert(&user_meta(), &encoded_ann(Dialect::Postgres)).unwrap();

    assert_sql_contains(&stmt.sql, &["INSERT INTO users (name, age, active) VALUES ($1, $2, $3)"]);
    // Postgres keeps native booleans.
    assert!(matches!(stmt.params[2], DbValue::Bool(Some(true))));
}

#[test]
fn mysql_quotes_with_backticks() {
    let syntax = Syntax::new(Dialect::MySql);
    let stmt = syntax.insert(&user_meta(), &encoded_ann(Dialect::MySql)).unwrap();

    assert!(stmt.sql.contains("`users`"), "expected backtick quoting in `{}`", stmt.sql);
    assert!(stmt.sql.contains('?'));
    assert!(!stmt.sql.contains('"'));
}

#[test]
fn insert_returning_names_the_identity_column() {
    let syntax = Syntax::new(Dialect::Postgres);
    let stmt = syntax.insert_returning(&user_meta(), &encoded_ann(Dialect::Postgres)).unwrap();

    assert_sql_contains(&stmt.sql, &[
        "INSERT INTO users (name, age, active) VALUES ($1, $2, $3)",
        "RETURNING id",
    ]);
}

#[test]
fn update_sets_every_value_field_keyed_by_identity() {
    let syntax = Syntax::new(Dialect::Sqlite);
    let meta = user_meta();
    let stmt = syntax
        .update(&meta, 9_i64.into(), &encoded_ann(Dialect::Sqlite))
        .unwrap();

    assert_sql_contains(&stmt.sql, &[
        "UPDATE users SET name = ?, age = ?, active = ?",
        "WHERE (id) = (?)",
    ]);
    assert_eq!(stmt.params.len(), 4);
    assert!(matches!(stmt.params[3], DbValue::Long(Some(9))));
}

#[test]
fn select_by_id_projects_declared_fields_in_order() {
    let syntax = Syntax::new(Dialect::Sqlite);
    let stmt = syntax.select_by_id(&user_meta(), 1_i64.into()).unwrap();

    assert_sql_contains(&stmt.sql, &[
        "SELECT id, name, age, active FROM users",
        "WHERE (id) = (?)",
    ]);
    assert_eq!(stmt.params.len(), 1);
}

#[test]
fn select_by_ids_uses_an_in_list() {
    let syntax = Syntax::new(Dialect::Sqlite);
    let stmt = syntax
        .select_by_ids(&user_meta(), vec![1_i64.into(), 2_i64.into(), 3_i64.into()])
        .unwrap();

    assert_sql_contains(&stmt.sql, &["SELECT id, name, age, active FROM users", "WHERE", "IN"]);
    assert_eq!(stmt.params.len(), 3);
    assert!(matches!(stmt.params[0], DbValue::Long(Some(1))));
    assert!(matches!(stmt.params[2], DbValue::Long(Some(3))));
}

#[test]
fn count_is_shape_only() {
    let syntax = Syntax::new(Dialect::Sqlite);
    let stmt = syntax.count(&user_meta()).unwrap();

    assert_sql_contains(&stmt.sql, &["SELECT COUNT(*) FROM users"]);
    assert!(stmt.params.is_empty());
}

#[test]
fn take_orders_by_identity_and_bounds() {
    let syntax = Syntax::new(Dialect::Sqlite);

    let asc = syntax.take(&user_meta(), 5, false).unwrap();
    assert_sql_contains(&asc.sql, &["ORDER BY id ASC", "LIMIT ?"]);

    let desc = syntax.take(&user_meta(), 5, true).unwrap();
    assert_sql_contains(&desc.sql, &["ORDER BY id DESC", "LIMIT ?"]);
    assert!(matches!(desc.params[0], DbValue::Ulong(Some(5))));
}

#[test]
fn delete_statements_per_shape() {
    let syntax = Syntax::new(Dialect::Sqlite);
    let meta = user_meta();

    let one = syntax.delete_by_id(&meta, 1_i64.into()).unwrap();
    assert_sql_contains(&one.sql, &["DELETE FROM users WHERE (id) = (?)"]);

    let many = syntax.delete_by_ids(&meta, vec![1_i64.into(), 2_i64.into()]).unwrap();
    assert_sql_contains(&many.sql, &["DELETE FROM users", "WHERE", "IN"]);
    assert_eq!(many.params.len(), 2);

    let all = syntax.delete_all(&meta).unwrap();
    assert_sql_contains(&all.sql, &["DELETE FROM users"]);
    assert!(all.params.is_empty());
}

#[test]
fn quoting_is_uniform_within_a_statement_set() {
    let syntax = Syntax::new(Dialect::MySql);
    let meta = user_meta();

    for stmt in [
        syntax.insert(&meta, &encoded_ann(Dialect::MySql)).unwrap(),
        syntax.select_all(&meta).unwrap(),
        syntax.delete_all(&meta).unwrap(),
    ] {
        assert!(!stmt.sql.contains('"'), "mixed quoting in `{}`", stmt.sql);
    }
}

#[test]
fn synthesis_is_deterministic() {
    let syntax = Syntax::new(Dialect::Postgres);
    let meta = user_meta();
    let row = encoded_ann(Dialect::Postgres);

    let first = syntax.insert(&meta, &row).unwrap();
    let second = syntax.insert(&meta, &row).unwrap();

    assert_eq!(first.sql, second.sql);
    assert_eq!(first.params, second.params);
}
