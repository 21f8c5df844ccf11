//! The execution-boundary trait and its failure taxonomy.

use std::sync::Arc;

use thiserror::Error;

use crate::types::{DbValue, RawId, Row};

/// Failure raised by a backend. Propagated verbatim by the storage core; no
/// retries, no partial-failure recovery happen above this boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// The backend could not be reached or the connection was lost.
    #[error("connection failure: {0}")]
    Connection(String),

    /// The statement was rejected or failed during execution.
    #[error("statement failed: {0}")]
    Statement(String),

    /// A constraint (unique, foreign key, check) rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The backend gave up waiting.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The backend does not support the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Synchronous database-execution boundary.
///
/// Every method blocks for one round trip and owns its connection lifecycle:
/// a connection (or equivalent handle) is acquired for the duration of one
/// statement and released before the call returns, even on failure.
/// Implementations must be safe to share across threads; the storage core
/// keeps no per-call state of its own.
pub trait Db {
    /// Execute a statement and return the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] when the statement is rejected or the backend
    /// fails.
    fn execute(&self, sql: &str, params: &[DbValue]) -> Result<u64, DbError>;

    /// Execute an insert and return the identity the backend generated.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] when the insert fails or the backend cannot
    /// report a generated identity.
    fn insert_returning_id(&self, sql: &str, params: &[DbValue]) -> Result<RawId, DbError>;

    /// Run a query and return every row.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] when the query is rejected or the backend fails.
    fn query(&self, sql: &str, params: &[DbValue]) -> Result<Vec<Row>, DbError>;

    /// Run a query expected to produce a single integer scalar (counts).
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] when the query fails or produces no scalar.
    fn scalar_long(&self, sql: &str, params: &[DbValue]) -> Result<i64, DbError>;

    /// Call a stored procedure that creates a record, returning the raw
    /// generated identity.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] when the call fails or the backend has no
    /// procedure support.
    fn call_create(&self, proc: &str, params: &[DbValue]) -> Result<RawId, DbError>;

    /// Call a stored procedure that mutates records, returning the affected
    /// row count.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] when the call fails or the backend has no
    /// procedure support.
    fn call_update(&self, proc: &str, params: &[DbValue]) -> Result<u64, DbError>;

    /// Call a stored procedure that reads records, returning every row.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] when the call fails or the backend has no
    /// procedure support.
    fn call_query(&self, proc: &str, params: &[DbValue]) -> Result<Vec<Row>, DbError>;
}

impl<D: Db + ?Sized> Db for &D {
    fn execute(&self, sql: &str, params: &[DbValue]) -> Result<u64, DbError> {
        (**self).execute(sql, params)
    }

    fn insert_returning_id(&self, sql: &str, params: &[DbValue]) -> Result<RawId, DbError> {
        (**self).insert_returning_id(sql, params)
    }

    fn query(&self, sql: &str, params: &[DbValue]) -> Result<Vec<Row>, DbError> {
        (**self).query(sql, params)
    }

    fn scalar_long(&self, sql: &str, params: &[DbValue]) -> Result<i64, DbError> {
        (**self).scalar_long(sql, params)
    }

    fn call_create(&self, proc: &str, params: &[DbValue]) -> Result<RawId, DbError> {
        (**self).call_create(proc, params)
    }

    fn call_update(&self, proc: &str, params: &[DbValue]) -> Result<u64, DbError> {
        (**self).call_update(proc, params)
    }

    fn call_query(&self, proc: &str, params: &[DbValue]) -> Result<Vec<Row>, DbError> {
        (**self).call_query(proc, params)
    }
}

impl<D: Db + ?Sized> Db for Arc<D> {
    fn execute(&self, sql: &str, params: &[DbValue]) -> Result<u64, DbError> {
        (**self).execute(sql, params)
    }

    fn insert_returning_id(&self, sql: &str, params: &[DbValue]) -> Result<RawId, DbError> {
        (**self).insert_returning_id(sql, params)
    }

    fn query(&self, sql: &str, params: &[DbValue]) -> Result<Vec<Row>, DbError> {
        (**self).query(sql, params)
    }

    fn scalar_long(&self, sql: &str, params: &[DbValue]) -> Result<i64, DbError> {
        (**self).scalar_long(sql, params)
    }

    fn call_create(&self, proc: &str, params: &[DbValue]) -> Result<RawId, DbError> {
        (**self).call_create(proc, params)
    }

    fn call_update(&self, proc: &str, params: &[DbValue]) -> Result<u64, DbError> {
        (**self).call_update(proc, params)
    }

    fn call_query(&self, proc: &str, params: &[DbValue]) -> Result<Vec<Row>, DbError> {
        (**self).call_query(proc, params)
    }
}
