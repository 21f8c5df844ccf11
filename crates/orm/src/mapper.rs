//! Entity-instance ↔ database-record translation.

use std::marker::PhantomData;

use sea_query::Value;
use tabula_sql::Row;

use crate::convert::Converter;
use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::meta::Meta;

/// Encodes entities into ordered column/value pairs and decodes returned
/// rows back into entities. Built once per repository; holds no per-call
/// state.
#[derive(Clone, Copy, Debug)]
pub struct Mapper<T: Entity> {
    converter: Converter,
    marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Mapper<T> {
    /// A mapper converting for the given dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { converter: Converter::new(dialect), marker: PhantomData }
    }

    /// The converter this mapper decodes with.
    #[must_use]
    pub const fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Encode an entity into column/value pairs in declared field order.
    /// The metadata is the authority for which columns exist: a declared
    /// column the entity does not supply is a schema error, a supplied value
    /// incompatible with its declared type is a conversion error, and entity
    /// values for undeclared columns are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] or [`Error::Convert`] as described above.
    pub fn encode(&self, meta: &Meta<T>, entity: &T) -> Result<Vec<(&'static str, Value)>> {
        let supplied = entity.values();

        meta.fields()
            .iter()
            .map(|spec| {
                let value = supplied
                    .iter()
                    .find(|(name, _)| *name == spec.name)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| {
                        Error::Schema(format!("entity supplies no value for column '{}'", spec.name))
                    })?;

                if !spec.ty.matches(&value) {
                    return Err(Error::Convert(format!(
                        "column '{}' is declared {:?} but the entity supplied an incompatible value",
                        spec.name, spec.ty
                    )));
                }

                Ok((spec.name, value))
            })
            .collect()
    }

    /// Decode a returned row into an entity. Columns the entity does not
    /// declare are ignored, keeping decode forward-compatible with additive
    /// schema changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] when a required column is absent or a
    /// value fails conversion; no partial entity is produced.
    pub fn decode(&self, row: &Row) -> Result<T> {
        T::from_row(&self.converter, row)
    }
}
