//! The repository operation surface and its shared SQL implementation.

use sea_query::Value;
use tabula_sql::Db;

use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::Result;
use crate::id::IdKey;
use crate::mapper::Mapper;
use crate::meta::Meta;
use crate::query::Query;
use crate::syntax::Syntax;

/// The full operation table exposed to callers, generic over any entity
/// whose identity is orderable and identity-convertible.
///
/// Zero-rows outcomes are reported as `false`/`0`, not errors. Query-driven
/// operations compile the query before anything executes, so a malformed
/// query never causes partial side effects. Vendors implement this trait,
/// typically by wrapping [`SqlRepo`] and overriding only identity-sensitive
/// writes.
pub trait Repository<T: Entity> {
    /// Persist a new entity, returning its typed identity.
    ///
    /// # Errors
    ///
    /// Returns an error on encode failure, backend write failure, or when
    /// the returned raw identity cannot become `T::Id`.
    fn create(&self, entity: &T) -> Result<T::Id>;

    /// Update every non-identity field of an existing entity, keyed by its
    /// identity. `false` when no row was affected.
    ///
    /// # Errors
    ///
    /// Returns an error on encode failure or backend write failure.
    fn update(&self, entity: &T) -> Result<bool>;

    /// Fetch one entity by identity.
    ///
    /// # Errors
    ///
    /// Returns an error on backend read failure or decode failure.
    fn get_by_id(&self, id: &T::Id) -> Result<Option<T>>;

    /// Fetch the entities matching the given identities. The result may be
    /// shorter than the input when some identities are absent.
    ///
    /// # Errors
    ///
    /// Returns an error on backend read failure or decode failure.
    fn get_by_ids(&self, ids: &[T::Id]) -> Result<Vec<T>>;

    /// Fetch every entity in the table.
    ///
    /// # Errors
    ///
    /// Returns an error on backend read failure or decode failure.
    fn get_all(&self) -> Result<Vec<T>>;

    /// Delete one row by identity. `false` when nothing was deleted;
    /// deleting an already-absent identity is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn delete_by_id(&self, id: &T::Id) -> Result<bool>;

    /// Delete the rows matching the given identities, returning the count
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn delete_by_ids(&self, ids: &[T::Id]) -> Result<u64>;

    /// Delete every row, returning the count deleted.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn delete_all(&self) -> Result<u64>;

    /// Total row count.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn count(&self) -> Result<i64>;

    /// A bounded sequence ordered by identity, ascending or descending.
    ///
    /// # Errors
    ///
    /// Returns an error on backend read failure or decode failure.
    fn seq(&self, count: u64, desc: bool) -> Result<Vec<T>>;

    /// Fetch entities matching a composed query.
    ///
    /// # Errors
    ///
    /// Returns a query error before execution when the query cannot
    /// compile; otherwise backend/decode errors.
    fn find_by_query(&self, query: &Query) -> Result<Vec<T>>;

    /// Delete rows matching a composed query, returning the count deleted.
    ///
    /// # Errors
    ///
    /// Returns a query error before execution when the query cannot compile
    /// or has no conditions; otherwise backend errors.
    fn delete_by_query(&self, query: &Query) -> Result<u64>;

    /// Count rows matching a composed query.
    ///
    /// # Errors
    ///
    /// Returns a query error before execution when the query cannot
    /// compile; otherwise backend errors.
    fn count_by_query(&self, query: &Query) -> Result<i64>;

    /// Apply a query's SET list to the rows matching its filter, returning
    /// the count updated.
    ///
    /// # Errors
    ///
    /// Returns a query error before execution when the SET list is empty or
    /// the query cannot compile; otherwise backend errors.
    fn patch_by_query(&self, query: &Query) -> Result<u64>;

    /// Create a record through a stored procedure, returning the typed
    /// identity it generated.
    ///
    /// # Errors
    ///
    /// Returns an error on argument conversion failure, backend procedure
    /// failure, or identity conversion failure.
    fn create_by_proc(&self, name: &str, args: Vec<Value>) -> Result<T::Id>;

    /// Mutate records through a stored procedure, returning the affected
    /// count.
    ///
    /// # Errors
    ///
    /// Returns an error on argument conversion failure or backend procedure
    /// failure.
    fn update_by_proc(&self, name: &str, args: Vec<Value>) -> Result<u64>;

    /// Fetch entities through a stored procedure.
    ///
    /// # Errors
    ///
    /// Returns an error on argument conversion failure, backend procedure
    /// failure, or decode failure.
    fn find_by_proc(&self, name: &str, args: Vec<Value>) -> Result<Vec<T>>;

    /// Delete records through a stored procedure, returning the affected
    /// count.
    ///
    /// # Errors
    ///
    /// Returns an error on argument conversion failure or backend procedure
    /// failure.
    fn delete_by_proc(&self, name: &str, args: Vec<Value>) -> Result<u64>;

    /// Delete an entity by its own identity. `false` when nothing was
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn delete(&self, entity: &T) -> Result<bool> {
        self.delete_by_id(&entity.id())
    }

    /// Whether a row with this identity exists.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn exists(&self, id: &T::Id) -> Result<bool> {
        Ok(self.get_by_id(id)?.is_some())
    }

    /// Whether the table holds any rows.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn any(&self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    /// The first entity matching a composed query, if any.
    ///
    /// # Errors
    ///
    /// Returns a query error before execution when the query cannot
    /// compile; otherwise backend/decode errors.
    fn find_one_by_query(&self, query: &Query) -> Result<Option<T>> {
        Ok(self.find_by_query(query)?.into_iter().next())
    }
}

/// Shared SQL implementation of [`Repository`].
///
/// Metadata, mapper, and syntax are immutable after construction and hold no
/// per-call state, so one instance can be shared across threads; the only
/// shared mutable resource is the backend behind [`Db`]. Nothing is cached
/// between calls.
pub struct SqlRepo<T: Entity, D: Db> {
    db: D,
    meta: Meta<T>,
    mapper: Mapper<T>,
    syntax: Syntax,
}

impl<T: Entity, D: Db> SqlRepo<T, D> {
    /// A repository over `db` for the schema in `meta`, speaking `dialect`.
    pub fn new(db: D, meta: Meta<T>, dialect: Dialect) -> Self {
        Self { db, meta, mapper: Mapper::new(dialect), syntax: Syntax::new(dialect) }
    }

    /// The schema this repository serves.
    pub const fn meta(&self) -> &Meta<T> {
        &self.meta
    }

    /// The backend handle.
    pub const fn db(&self) -> &D {
        &self.db
    }

    pub(crate) const fn mapper(&self) -> &Mapper<T> {
        &self.mapper
    }

    pub(crate) const fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    fn decode_all(&self, rows: Vec<tabula_sql::Row>) -> Result<Vec<T>> {
        rows.iter().map(|row| self.mapper.decode(row)).collect()
    }
}

impl<T: Entity, D: Db> Repository<T> for SqlRepo<T, D> {
    fn create(&self, entity: &T) -> Result<T::Id> {
        let row = self.mapper.encode(&self.meta, entity)?;
        let stmt = self.syntax.insert(&self.meta, &row)?;

        if self.meta.id().is_generated() {
            let raw = self.db.insert_returning_id(&stmt.sql, &stmt.params)?;
            T::Id::from_raw(raw)
        } else {
            // Caller-assigned identity: the backend generates nothing, so
            // the entity's own id is the answer.
            self.db.execute(&stmt.sql, &stmt.params)?;
            Ok(entity.id())
        }
    }

    fn update(&self, entity: &T) -> Result<bool> {
        let row = self.mapper.encode(&self.meta, entity)?;
        let stmt = self.syntax.update(&self.meta, entity.id().to_value(), &row)?;
        Ok(self.db.execute(&stmt.sql, &stmt.params)? > 0)
    }

    fn get_by_id(&self, id: &T::Id) -> Result<Option<T>> {
        let stmt = self.syntax.select_by_id(&self.meta, id.to_value())?;
        let rows = self.db.query(&stmt.sql, &stmt.params)?;
        rows.first().map(|row| self.mapper.decode(row)).transpose()
    }

    fn get_by_ids(&self, ids: &[T::Id]) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let values = ids.iter().map(IdKey::to_value).collect();
        let stmt = self.syntax.select_by_ids(&self.meta, values)?;
        self.decode_all(self.db.query(&stmt.sql, &stmt.params)?)
    }

    fn get_all(&self) -> Result<Vec<T>> {
        let stmt = self.syntax.select_all(&self.meta)?;
        self.decode_all(self.db.query(&stmt.sql, &stmt.params)?)
    }

    fn delete_by_id(&self, id: &T::Id) -> Result<bool> {
        let stmt = self.syntax.delete_by_id(&self.meta, id.to_value())?;
        Ok(self.db.execute(&stmt.sql, &stmt.params)? > 0)
    }

    fn delete_by_ids(&self, ids: &[T::Id]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let values = ids.iter().map(IdKey::to_value).collect();
        let stmt = self.syntax.delete_by_ids(&self.meta, values)?;
        self.db.execute(&stmt.sql, &stmt.params).map_err(Into::into)
    }

    fn delete_all(&self) -> Result<u64> {
        let stmt = self.syntax.delete_all(&self.meta)?;
        self.db.execute(&stmt.sql, &stmt.params).map_err(Into::into)
    }

    fn count(&self) -> Result<i64> {
        let stmt = self.syntax.count(&self.meta)?;
        self.db.scalar_long(&stmt.sql, &stmt.params).map_err(Into::into)
    }

    fn seq(&self, count: u64, desc: bool) -> Result<Vec<T>> {
        let stmt = self.syntax.take(&self.meta, count, desc)?;
        self.decode_all(self.db.query(&stmt.sql, &stmt.params)?)
    }

    fn find_by_query(&self, query: &Query) -> Result<Vec<T>> {
        let stmt = self.syntax.select_where(&self.meta, query)?;
        self.decode_all(self.db.query(&stmt.sql, &stmt.params)?)
    }

    fn delete_by_query(&self, query: &Query) -> Result<u64> {
        let stmt = self.syntax.delete_where(&self.meta, query)?;
        self.db.execute(&stmt.sql, &stmt.params).map_err(Into::into)
    }

    fn count_by_query(&self, query: &Query) -> Result<i64> {
        let stmt = self.syntax.count_where(&self.meta, query)?;
        self.db.scalar_long(&stmt.sql, &stmt.params).map_err(Into::into)
    }

    fn patch_by_query(&self, query: &Query) -> Result<u64> {
        let stmt = self.syntax.update_where(&self.meta, query)?;
        self.db.execute(&stmt.sql, &stmt.params).map_err(Into::into)
    }

    fn create_by_proc(&self, name: &str, args: Vec<Value>) -> Result<T::Id> {
        let params = self.syntax.params(args)?;
        let raw = self.db.call_create(name, &params)?;
        T::Id::from_raw(raw)
    }

    fn update_by_proc(&self, name: &str, args: Vec<Value>) -> Result<u64> {
        let params = self.syntax.params(args)?;
        self.db.call_update(name, &params).map_err(Into::into)
    }

    fn find_by_proc(&self, name: &str, args: Vec<Value>) -> Result<Vec<T>> {
        let params = self.syntax.params(args)?;
        self.decode_all(self.db.call_query(name, &params)?)
    }

    fn delete_by_proc(&self, name: &str, args: Vec<Value>) -> Result<u64> {
        let params = self.syntax.params(args)?;
        self.db.call_update(name, &params).map_err(Into::into)
    }
}
