//! Database-execution boundary for the Tabula storage core.
//!
//! This crate owns the narrow surface the storage core needs from a raw
//! database connection: a tagged value union for parameters and results
//! ([`DbValue`]), row types ([`Row`], [`Field`]), the raw identity a backend
//! hands back on insert ([`RawId`]), and the [`Db`] trait every backend
//! implements. Each `Db` call is synchronous and owns its own connection
//! lifecycle: acquired for one statement, released before the call returns,
//! success or failure.
//!
//! A bundled SQLite backend ([`SqliteDb`]) serves as the reference
//! implementation and as the test harness for the layers above.

#![forbid(unsafe_code)]

mod db;
mod sqlite;
mod types;

pub use db::{Db, DbError};
pub use sqlite::SqliteDb;
pub use types::{DbValue, Field, RawId, Row};
