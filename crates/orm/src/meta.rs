//! Static schema description of an entity: table name, identity field, and
//! the ordered field list. Declared explicitly at wiring time; nothing here
//! is discovered from a live entity instance.

use std::marker::PhantomData;

use sea_query::Value;

use crate::entity::Entity;
use crate::error::{Error, Result};

/// Semantic column type of a declared field. The converter must be total
/// over every type reachable through a [`Meta`]; a value that does not fit
/// its declared type surfaces as a conversion error, never a panic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// Boolean column. Some dialects store this as an integer.
    Bool,
    /// 32-bit integer column.
    Int,
    /// 64-bit integer column.
    Long,
    /// 32-bit float column.
    Float,
    /// 64-bit float column.
    Double,
    /// Text column.
    Text,
    /// Binary column.
    Bytes,
    /// Calendar date column.
    Date,
    /// Time-of-day column.
    Time,
    /// Timestamp column.
    DateTime,
    /// UUID column, stored as text.
    Uuid,
    /// JSON column, stored as text.
    Json,
    /// Enumeration stored as its string form.
    Enum,
}

impl FieldType {
    /// Whether a parameter value is an acceptable representation of this
    /// declared type. NULLs ride inside the value variants, so a typed NULL
    /// matches the same way its non-null form does.
    pub(crate) fn matches(self, value: &Value) -> bool {
        match self {
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Int => matches!(
                value,
                Value::TinyInt(_)
                    | Value::SmallInt(_)
                    | Value::Int(_)
                    | Value::TinyUnsigned(_)
                    | Value::SmallUnsigned(_)
            ),
            Self::Long => matches!(
                value,
                Value::TinyInt(_)
                    | Value::SmallInt(_)
                    | Value::Int(_)
                    | Value::BigInt(_)
                    | Value::TinyUnsigned(_)
                    | Value::SmallUnsigned(_)
                    | Value::Unsigned(_)
                    | Value::BigUnsigned(_)
            ),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Double => matches!(value, Value::Float(_) | Value::Double(_)),
            Self::Text | Self::Enum => matches!(value, Value::String(_) | Value::Char(_)),
            Self::Bytes => matches!(value, Value::Bytes(_)),
            Self::Date => matches!(value, Value::ChronoDate(_)),
            Self::Time => matches!(value, Value::ChronoTime(_)),
            Self::DateTime => {
                matches!(value, Value::ChronoDateTime(_) | Value::ChronoDateTimeUtc(_))
            }
            Self::Uuid => matches!(value, Value::Uuid(_)),
            Self::Json => matches!(value, Value::Json(_) | Value::String(_)),
        }
    }
}

/// One declared non-identity or identity column.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    /// Column name.
    pub name: &'static str,
    /// Semantic column type.
    pub ty: FieldType,
    /// Whether the column admits NULL.
    pub nullable: bool,
}

impl FieldSpec {
    /// Declare a non-nullable column.
    #[must_use]
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty, nullable: false }
    }

    /// Mark the column nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// The identity column and how its value comes to exist.
#[derive(Clone, Debug)]
pub struct IdSpec {
    name: &'static str,
    generated: bool,
}

impl IdSpec {
    /// An identity the backend generates on insert (auto-increment,
    /// sequence, rowid). Excluded from insert column lists.
    #[must_use]
    pub const fn generated(name: &'static str) -> Self {
        Self { name, generated: true }
    }

    /// An identity the caller assigns before insert. Included in insert
    /// column lists.
    #[must_use]
    pub const fn assigned(name: &'static str) -> Self {
        Self { name, generated: false }
    }

    /// The identity column name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the backend generates this identity.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }
}

/// Immutable schema description for one entity type.
///
/// Constructed once at application wiring time and shared read-only by every
/// repository built over it. Construction fails when the identity field is
/// absent from the field list or when no non-identity field remains to
/// insert or update.
#[derive(Clone, Debug)]
pub struct Meta<T: Entity> {
    table: &'static str,
    id: IdSpec,
    fields: Vec<FieldSpec>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Meta<T> {
    /// Declare the schema for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when the identity field is not in `fields`
    /// or when `fields` holds no non-identity column.
    pub fn new(table: &'static str, id: IdSpec, fields: Vec<FieldSpec>) -> Result<Self> {
        if !fields.iter().any(|field| field.name == id.name()) {
            return Err(Error::Schema(format!(
                "identity field '{}' is not declared in the field list for table '{table}'",
                id.name()
            )));
        }
        if fields.iter().all(|field| field.name == id.name()) {
            return Err(Error::Schema(format!(
                "table '{table}' declares no non-identity fields; nothing to insert or update"
            )));
        }

        Ok(Self { table, id, fields, marker: PhantomData })
    }

    /// The unquoted table name. Quoting is applied uniformly by the dialect
    /// writer when statements render.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// The identity column specification.
    #[must_use]
    pub const fn id(&self) -> &IdSpec {
        &self.id
    }

    /// Every declared field, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Fields that participate in an insert: declaration order, identity
    /// excluded when the backend generates it.
    pub(crate) fn insert_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|field| !(self.id.is_generated() && field.name == self.id.name()))
    }

    /// Non-identity fields, in declaration order. These are the SET targets
    /// of a whole-entity update.
    pub(crate) fn value_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.name != self.id.name())
    }

    /// The typed identity of an entity instance.
    pub fn id_of(&self, entity: &T) -> T::Id {
        entity.id()
    }
}
