//! The entity trait and its declaration macro.

use sea_query::Value;
use tabula_sql::Row;

use crate::convert::Converter;
use crate::error::Result;
use crate::id::IdKey;

/// A domain object stored in one table row.
///
/// Typically implemented via the [`entity!`](crate::entity!) macro rather
/// than manually. The statically declared schema lives in a
/// [`Meta`](crate::Meta) built at wiring time; the trait only carries what a
/// live instance can answer: its identity, its column values, and how to
/// rebuild itself from a returned row.
pub trait Entity: Sized {
    /// The identity type; totally ordered and convertible from raw backend
    /// identities.
    type Id: IdKey;

    /// The identity value of this instance.
    fn id(&self) -> Self::Id;

    /// Every field as a named parameter value, in declaration order.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Rebuild an instance from a returned row.
    ///
    /// # Errors
    ///
    /// Returns an error when a required column is absent or a value cannot
    /// be converted to the field's type. Columns the entity does not declare
    /// are ignored.
    fn from_row(conv: &Converter, row: &Row) -> Result<Self>;
}

/// Declares a storable entity with an automatic [`Entity`] implementation.
///
/// # Examples
///
/// ```ignore
/// entity! {
///     id = id: i64,
///     #[derive(Debug, Clone)]
///     pub struct User {
///         pub id: i64,
///         pub name: String,
///         pub age: i32,
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity {
    (
        id = $id:ident : $id_ty:ty,
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                pub $field:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        #[allow(missing_docs)]
        $(#[$meta])*
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field : $field_ty
            ),*
        }

        impl $crate::Entity for $name {
            type Id = $id_ty;

            fn id(&self) -> Self::Id {
                self.$id.clone()
            }

            fn values(&self) -> Vec<(&'static str, $crate::Value)> {
                vec![
                    $(
                        (stringify!($field), self.$field.clone().into()),
                    )*
                ]
            }

            fn from_row(conv: &$crate::Converter, row: &$crate::Row) -> $crate::Result<Self> {
                Ok(Self {
                    $(
                        $field: <$field_ty as $crate::FromDb>::fetch(conv, row, stringify!($field))?,
                    )*
                })
            }
        }
    };
}
