//! Typed repository layer over SQL databases.
//!
//! Maps domain entities to and from SQL records across multiple dialects:
//! statically declared schema metadata, dialect-pluggable statement
//! synthesis, a typed value-conversion layer, and a composable query builder
//! so no per-entity SQL is ever hand-written.
//!
//! # Quick Start
//!
//! ## Declare an entity and its schema
//!
//! ```ignore
//! use tabula_orm::{entity, FieldSpec, FieldType, IdSpec, Meta};
//!
//! entity! {
//!     id = id: i64,
//!     #[derive(Debug, Clone)]
//!     pub struct User {
//!         pub id: i64,
//!         pub name: String,
//!         pub age: i32,
//!     }
//! }
//!
//! let meta = Meta::<User>::new("users", IdSpec::generated("id"), vec![
//!     FieldSpec::new("id", FieldType::Long),
//!     FieldSpec::new("name", FieldType::Text),
//!     FieldSpec::new("age", FieldType::Int),
//! ])?;
//! ```
//!
//! ## Wire a repository and use it
//!
//! ```ignore
//! use tabula_orm::{vendors, Filter, Query, Repository};
//! use tabula_sql::SqliteDb;
//!
//! let db = SqliteDb::in_memory()?;
//! let users = vendors::sqlite::repo(db, meta);
//!
//! let id = users.create(&User { id: 0, name: "Ann".into(), age: 30 })?;
//! let ann = users.get_by_id(&id)?;
//!
//! let adults = users.find_by_query(
//!     &Query::new().filter(Filter::gt("age", 20)).order_by("name").limit(10),
//! )?;
//!
//! let patched = users.patch_by_query(
//!     &Query::new().set("age", 31).filter(Filter::eq("name", "Ann")),
//! )?;
//! ```
//!
//! ## Swap the vendor
//!
//! ```ignore
//! // Same meta, same entity; only the wiring changes. Postgres retrieves
//! // generated identities via INSERT ... RETURNING, MySQL via
//! // last-insert-id; callers never see the difference.
//! let users = vendors::postgres::repo(db, meta);
//! ```
//!
//! Repositories never cache statements or entities: every call recomputes
//! its SQL from the metadata and the current arguments, so schema and vendor
//! changes take effect immediately. Every operation is one synchronous round
//! trip through the [`Db`] boundary.

mod convert;
mod dialect;
mod entity;
mod error;
mod id;
mod mapper;
mod meta;
mod query;
mod repo;
mod syntax;
pub mod vendors;

pub use convert::{Converter, FromDb};
pub use dialect::Dialect;
pub use entity::Entity;
pub use error::{Error, Result};
pub use id::IdKey;
pub use mapper::Mapper;
pub use meta::{FieldSpec, FieldType, IdSpec, Meta};
pub use query::{Filter, Query};
pub use repo::{Repository, SqlRepo};
// Statement parameters are plain `sea_query` values; entity fields convert
// via `Into<Value>`.
pub use sea_query::Value;
pub use syntax::{Statement, Syntax};
// Re-export boundary types so callers and the `entity!` macro need only this
// crate.
pub use tabula_sql::{Db, DbError, DbValue, Field, RawId, Row};
