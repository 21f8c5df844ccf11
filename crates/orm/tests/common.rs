//! Common test helpers shared across integration tests.
#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tabula_orm::{
    Db, DbError, FieldSpec, FieldType, IdSpec, Meta, RawId, Row, SqlRepo, entity, vendors,
};
use tabula_sql::SqliteDb;

// Common test entities used across multiple test files

entity! {
    id = id: i64,
    #[derive(Debug, Clone, PartialEq)]
    pub struct User {
        pub id: i64,
        pub name: String,
        pub age: i32,
        pub active: bool,
    }
}

entity! {
    id = id: i64,
    #[derive(Debug, Clone, PartialEq)]
    pub struct Event {
        pub id: i64,
        pub occurred_at: DateTime<Utc>,
    }
}

entity! {
    id = code: String,
    #[derive(Debug, Clone, PartialEq)]
    pub struct Setting {
        pub code: String,
        pub value: String,
    }
}

pub fn user_meta() -> Meta<User> {
    Meta::new("users", IdSpec::generated("id"), vec![
        FieldSpec::new("id", FieldType::Long),
        FieldSpec::new("name", FieldType::Text),
        FieldSpec::new("age", FieldType::Int),
        FieldSpec::new("active", FieldType::Bool),
    ])
    .unwrap()
}

pub fn event_meta() -> Meta<Event> {
    Meta::new("events", IdSpec::generated("id"), vec![
        FieldSpec::new("id", FieldType::Long),
        FieldSpec::new("occurred_at", FieldType::DateTime),
    ])
    .unwrap()
}

pub fn setting_meta() -> Meta<Setting> {
    Meta::new("settings", IdSpec::assigned("code"), vec![
        FieldSpec::new("code", FieldType::Text),
        FieldSpec::new("value", FieldType::Text),
    ])
    .unwrap()
}

pub fn ann() -> User {
    User { id: 0, name: "Ann".to_string(), age: 30, active: true }
}

/// Opt-in log output for debugging test runs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("tabula_orm=debug").try_init();
}

/// A SQLite-backed user repository over a fresh in-memory database.
pub fn users_repo() -> SqlRepo<User, SqliteDb> {
    let db = SqliteDb::in_memory().unwrap();
    db.execute(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            active INTEGER NOT NULL
        )",
        &[],
    )
    .unwrap();
    vendors::sqlite::repo(db, user_meta())
}

pub fn events_repo() -> SqlRepo<Event, SqliteDb> {
    let db = SqliteDb::in_memory().unwrap();
    db.execute(
        "CREATE TABLE events (id INTEGER PRIMARY KEY AUTOINCREMENT, occurred_at TEXT NOT NULL)",
        &[],
    )
    .unwrap();
    vendors::sqlite::repo(db, event_meta())
}

pub fn settings_repo() -> SqlRepo<Setting, SqliteDb> {
    let db = SqliteDb::in_memory().unwrap();
    db.execute("CREATE TABLE settings (code TEXT PRIMARY KEY, value TEXT NOT NULL)", &[])
        .unwrap();
    vendors::sqlite::repo(db, setting_meta())
}

/// A scripted backend for exercising stored-procedure operations; SQLite
/// cannot host procedures. Records every call it receives.
pub struct ProcDb {
    pub raw_id: RawId,
    pub affected: u64,
    pub rows: Vec<Row>,
    pub calls: Mutex<Vec<String>>,
}

impl ProcDb {
    pub fn new() -> Self {
        Self {
            raw_id: RawId::Long(7),
            affected: 2,
            rows: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, name: &str, params: usize) {
        self.calls.lock().unwrap().push(format!("{name}/{params}"));
    }
}

impl Db for ProcDb {
    fn execute(&self, _: &str, _: &[tabula_orm::DbValue]) -> Result<u64, DbError> {
        Err(DbError::Unsupported("scripted procedure backend".to_string()))
    }

    fn insert_returning_id(&self, _: &str, _: &[tabula_orm::DbValue]) -> Result<RawId, DbError> {
        Err(DbError::Unsupported("scripted procedure backend".to_string()))
    }

    fn query(&self, _: &str, _: &[tabula_orm::DbValue]) -> Result<Vec<Row>, DbError> {
        Err(DbError::Unsupported("scripted procedure backend".to_string()))
    }

    fn scalar_long(&self, _: &str, _: &[tabula_orm::DbValue]) -> Result<i64, DbError> {
        Err(DbError::Unsupported("scripted procedure backend".to_string()))
    }

    fn call_create(&self, proc: &str, params: &[tabula_orm::DbValue]) -> Result<RawId, DbError> {
        self.record(proc, params.len());
        Ok(self.raw_id.clone())
    }

    fn call_update(&self, proc: &str, params: &[tabula_orm::DbValue]) -> Result<u64, DbError> {
        self.record(proc, params.len());
        Ok(self.affected)
    }

    fn call_query(&self, proc: &str, params: &[tabula_orm::DbValue]) -> Result<Vec<Row>, DbError> {
        self.record(proc, params.len());
        Ok(self.rows.clone())
    }
}

/// Normalize SQL by collapsing whitespace.
fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalize SQL for comparison by removing identifier quotes (double
/// quotes and backticks) and normalizing whitespace. Preserves quotes inside
/// string literals.
fn canonicalize_sql(sql: &str) -> String {
    let mut cleaned = String::with_capacity(sql.len());
    let mut in_single_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_single_quote = !in_single_quote;
                cleaned.push(ch);
            }
            '"' | '`' if !in_single_quote => {
                // Strip identifier quoting to avoid brittle comparisons.
            }
            _ => cleaned.push(ch),
        }
    }

    normalize_sql(&cleaned)
}

/// Assert that SQL contains all expected fragments in order.
///
/// Normalizes the SQL first so assertions stay independent of identifier
/// quoting and whitespace.
pub fn assert_sql_contains(actual: &str, fragments: &[&str]) {
    let actual_canonical = canonicalize_sql(actual);
    let mut search_start = 0usize;

    for fragment in fragments {
        let fragment_canonical = canonicalize_sql(fragment);
        if fragment_canonical.is_empty() {
            continue;
        }

        if let Some(pos) = actual_canonical[search_start..].find(&fragment_canonical) {
            search_start += pos + fragment_canonical.len();
        } else {
            panic!(
                "expected SQL fragment `{fragment_canonical}` not found in `{actual_canonical}`"
            );
        }
    }
}
