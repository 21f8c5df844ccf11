//! Vendor wiring: one constructor per supported dialect.
//!
//! Registering a vendor means choosing a dialect (which fixes syntax and
//! conversion) and, where identity retrieval differs, a repository wrapper
//! overriding the identity-sensitive writes. Everything else is the shared
//! [`SqlRepo`] implementation, reused by delegation.

use sea_query::Value;
use tabula_sql::{Db, DbError, DbValue, RawId};

use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::id::IdKey;
use crate::meta::Meta;
use crate::query::Query;
use crate::repo::{Repository, SqlRepo};

/// MySQL / MariaDB wiring.
pub mod mysql {
    use super::{Db, Dialect, Entity, Meta, SqlRepo};

    /// A MySQL repository. Generated identities come back through the
    /// backend's last-insert-id channel.
    pub fn repo<T: Entity, D: Db>(db: D, meta: Meta<T>) -> SqlRepo<T, D> {
        SqlRepo::new(db, meta, Dialect::MySql)
    }
}

/// SQLite wiring.
pub mod sqlite {
    use super::{Db, Dialect, Entity, Meta, SqlRepo};

    /// A SQLite repository. Generated identities come back as the last
    /// insert rowid.
    pub fn repo<T: Entity, D: Db>(db: D, meta: Meta<T>) -> SqlRepo<T, D> {
        SqlRepo::new(db, meta, Dialect::Sqlite)
    }
}

/// PostgreSQL wiring.
pub mod postgres {
    use super::{Db, Dialect, Entity, Meta, PgRepo, SqlRepo};

    /// A PostgreSQL repository. `create` runs `INSERT ... RETURNING` and
    /// reads the generated identity from the returned row; every other
    /// operation is the shared implementation.
    pub fn repo<T: Entity, D: Db>(db: D, meta: Meta<T>) -> PgRepo<T, D> {
        PgRepo { inner: SqlRepo::new(db, meta, Dialect::Postgres) }
    }
}

/// PostgreSQL repository: [`SqlRepo`] with `create` replaced by the
/// RETURNING-based identity path.
pub struct PgRepo<T: Entity, D: Db> {
    inner: SqlRepo<T, D>,
}

impl<T: Entity, D: Db> PgRepo<T, D> {
    /// The schema this repository serves.
    pub const fn meta(&self) -> &Meta<T> {
        self.inner.meta()
    }
}

/// Pull the identity column out of a RETURNING row as a raw identity.
fn returned_raw_id(value: &DbValue, column: &str) -> Result<RawId> {
    match value {
        DbValue::Int(Some(v)) => Ok(RawId::Long(i64::from(*v))),
        DbValue::Long(Some(v)) => Ok(RawId::Long(*v)),
        DbValue::Text(Some(v)) => Ok(RawId::Text(v.clone())),
        other => Err(Error::Convert(format!(
            "returned identity column '{column}' holds no usable value: {other:?}"
        ))),
    }
}

impl<T: Entity, D: Db> Repository<T> for PgRepo<T, D> {
    fn create(&self, entity: &T) -> Result<T::Id> {
        if !self.inner.meta().id().is_generated() {
            return self.inner.create(entity);
        }

        let meta = self.inner.meta();
        let row = self.inner.mapper().encode(meta, entity)?;
        let stmt = self.inner.syntax().insert_returning(meta, &row)?;

        let rows = self.inner.db().query(&stmt.sql, &stmt.params)?;
        let returned = rows.first().ok_or_else(|| {
            Error::Db(DbError::Statement("insert returned no identity row".to_string()))
        })?;
        let id_column = meta.id().name();
        let value = returned.field(id_column).ok_or_else(|| {
            Error::Convert(format!("returned row has no identity column '{id_column}'"))
        })?;

        T::Id::from_raw(returned_raw_id(value, id_column)?)
    }

    fn update(&self, entity: &T) -> Result<bool> {
        self.inner.update(entity)
    }

    fn get_by_id(&self, id: &T::Id) -> Result<Option<T>> {
        self.inner.get_by_id(id)
    }

    fn get_by_ids(&self, ids: &[T::Id]) -> Result<Vec<T>> {
        self.inner.get_by_ids(ids)
    }

    fn get_all(&self) -> Result<Vec<T>> {
        self.inner.get_all()
    }

    fn delete_by_id(&self, id: &T::Id) -> Result<bool> {
        self.inner.delete_by_id(id)
    }

    fn delete_by_ids(&self, ids: &[T::Id]) -> Result<u64> {
        self.inner.delete_by_ids(ids)
    }

    fn delete_all(&self) -> Result<u64> {
        self.inner.delete_all()
    }

    fn count(&self) -> Result<i64> {
        self.inner.count()
    }

    fn seq(&self, count: u64, desc: bool) -> Result<Vec<T>> {
        self.inner.seq(count, desc)
    }

    fn find_by_query(&self, query: &Query) -> Result<Vec<T>> {
        self.inner.find_by_query(query)
    }

    fn delete_by_query(&self, query: &Query) -> Result<u64> {
        self.inner.delete_by_query(query)
    }

    fn count_by_query(&self, query: &Query) -> Result<i64> {
        self.inner.count_by_query(query)
    }

    fn patch_by_query(&self, query: &Query) -> Result<u64> {
        self.inner.patch_by_query(query)
    }

    fn create_by_proc(&self, name: &str, args: Vec<Value>) -> Result<T::Id> {
        self.inner.create_by_proc(name, args)
    }

    fn update_by_proc(&self, name: &str, args: Vec<Value>) -> Result<u64> {
        self.inner.update_by_proc(name, args)
    }

    fn find_by_proc(&self, name: &str, args: Vec<Value>) -> Result<Vec<T>> {
        self.inner.find_by_proc(name, args)
    }

    fn delete_by_proc(&self, name: &str, args: Vec<Value>) -> Result<u64> {
        self.inner.delete_by_proc(name, args)
    }
}
