//! Errors

use tabula_sql::DbError;
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy of the storage core.
///
/// Zero-rows-affected outcomes are not errors; repository operations report
/// them as `false` or `0`. Everything here is a genuine failure and is never
/// converted into a default value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Schema wiring is inconsistent: identity field missing from the field
    /// list, nothing to insert, or an entity that does not supply a declared
    /// column. Raised at construction or on first use, never recoverable.
    #[error("schema error: {0}")]
    Schema(String),

    /// A value could not be converted between its in-memory type and its
    /// column representation, or a raw identity could not become a typed one.
    #[error("conversion failed: {0}")]
    Convert(String),

    /// A query tree could not be compiled into SQL. Detected before any
    /// statement executes, so no partial side effects occur.
    #[error("query error: {0}")]
    Query(String),

    /// The execution boundary failed. Propagated verbatim; the storage core
    /// performs no retries.
    #[error(transparent)]
    Db(#[from] DbError),
}
