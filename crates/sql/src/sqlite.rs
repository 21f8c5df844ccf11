//! SQLite implementation of the execution boundary.
//!
//! Backed by `rusqlite` with a bundled SQLite build. The connection is held
//! behind a mutex; each boundary call locks it for exactly one statement,
//! which satisfies the scoped-acquisition contract of [`Db`].

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::Connection;
use rusqlite::types::Value as SqliteValue;

use crate::db::{Db, DbError};
use crate::types::{DbValue, Field, RawId, Row};

/// A [`Db`] backend over a single SQLite connection.
///
/// SQLite has no stored procedures, so the `call_*` operations report
/// [`DbError::Unsupported`].
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] when SQLite cannot be initialised.
    pub fn in_memory() -> Result<Self, DbError> {
        let conn =
            Connection::open_in_memory().map_err(|err| DbError::Connection(err.to_string()))?;
        tracing::debug!("opened in-memory sqlite database");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open a database file, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn =
            Connection::open(path.as_ref()).map_err(|err| DbError::Connection(err.to_string()))?;
        tracing::debug!(path = %path.as_ref().display(), "opened sqlite database");
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl Db for SqliteDb {
    fn execute(&self, sql: &str, params: &[DbValue]) -> Result<u64, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql).map_err(map_err)?;
        let count =
            stmt.execute(rusqlite::params_from_iter(bind(params)?)).map_err(map_err)?;
        Ok(count as u64)
    }

    fn insert_returning_id(&self, sql: &str, params: &[DbValue]) -> Result<RawId, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql).map_err(map_err)?;
        stmt.execute(rusqlite::params_from_iter(bind(params)?)).map_err(map_err)?;
        Ok(RawId::Long(conn.last_insert_rowid()))
    }

    fn query(&self, sql: &str, params: &[DbValue]) -> Result<Vec<Row>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql).map_err(map_err)?;
        let names: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();

        let mut rows = stmt.query(rusqlite::params_from_iter(bind(params)?)).map_err(map_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(map_err)? {
            let mut fields = Vec::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                let value: SqliteValue = row.get(index).map_err(map_err)?;
                fields.push(Field { name: name.clone(), value: unbind(value) });
            }
            out.push(Row { fields });
        }
        Ok(out)
    }

    fn scalar_long(&self, sql: &str, params: &[DbValue]) -> Result<i64, DbError> {
        let conn = self.conn.lock();
        conn.query_row(sql, rusqlite::params_from_iter(bind(params)?), |row| row.get(0))
            .map_err(map_err)
    }

    fn call_create(&self, proc: &str, _params: &[DbValue]) -> Result<RawId, DbError> {
        Err(DbError::Unsupported(format!("sqlite has no stored procedures: {proc}")))
    }

    fn call_update(&self, proc: &str, _params: &[DbValue]) -> Result<u64, DbError> {
        Err(DbError::Unsupported(format!("sqlite has no stored procedures: {proc}")))
    }

    fn call_query(&self, proc: &str, _params: &[DbValue]) -> Result<Vec<Row>, DbError> {
        Err(DbError::Unsupported(format!("sqlite has no stored procedures: {proc}")))
    }
}

/// Convert boundary values into SQLite parameter values. Typed NULLs all
/// collapse to SQLite NULL.
fn bind(params: &[DbValue]) -> Result<Vec<SqliteValue>, DbError> {
    params.iter().map(bind_one).collect()
}

fn bind_one(value: &DbValue) -> Result<SqliteValue, DbError> {
    let bound = match value.clone() {
        DbValue::Bool(Some(v)) => SqliteValue::Integer(i64::from(v)),
        DbValue::Int(Some(v)) => SqliteValue::Integer(i64::from(v)),
        DbValue::Long(Some(v)) => SqliteValue::Integer(v),
        DbValue::Uint(Some(v)) => SqliteValue::Integer(i64::from(v)),
        DbValue::Ulong(Some(v)) => SqliteValue::Integer(
            i64::try_from(v)
                .map_err(|_| DbError::Statement(format!("parameter {v} exceeds sqlite range")))?,
        ),
        DbValue::Float(Some(v)) => SqliteValue::Real(f64::from(v)),
        DbValue::Double(Some(v)) => SqliteValue::Real(v),
        DbValue::Text(Some(v))
        | DbValue::Date(Some(v))
        | DbValue::Time(Some(v))
        | DbValue::Timestamp(Some(v)) => SqliteValue::Text(v),
        DbValue::Bytes(Some(v)) => SqliteValue::Blob(v),
        // Every typed NULL collapses to SQLite NULL.
        _ => SqliteValue::Null,
    };
    Ok(bound)
}

/// SQLite reports only four storage classes; everything narrower is the
/// converter's job.
fn unbind(value: SqliteValue) -> DbValue {
    match value {
        SqliteValue::Null => DbValue::Text(None),
        SqliteValue::Integer(v) => DbValue::Long(Some(v)),
        SqliteValue::Real(v) => DbValue::Double(Some(v)),
        SqliteValue::Text(v) => DbValue::Text(Some(v)),
        SqliteValue::Blob(v) => DbValue::Bytes(Some(v)),
    }
}

fn map_err(err: rusqlite::Error) -> DbError {
    use rusqlite::ErrorCode;

    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => DbError::Constraint(err.to_string()),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
            DbError::Timeout(err.to_string())
        }
        Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase) => {
            DbError::Connection(err.to_string())
        }
        _ => DbError::Statement(err.to_string()),
    }
}
