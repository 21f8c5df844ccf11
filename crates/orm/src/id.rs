//! Typed identity keys and the single raw-to-typed coercion point.
//!
//! A backend reports a generated identity as a [`RawId`] (numeric or
//! textual); `IdKey::from_raw` turns that into the entity's identity type.
//! Conversion is deterministic and total over every faithful raw/typed
//! pairing; an unsupported pairing fails fast instead of coercing.

use sea_query::Value;
use tabula_sql::RawId;
use uuid::Uuid;

use crate::error::{Error, Result};

/// An entity identity: totally ordered, cloneable, convertible from the raw
/// identity a backend returns on insert, and expressible as a statement
/// parameter.
pub trait IdKey: Ord + Clone {
    /// Convert a raw backend identity into this key type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] when the raw value has no faithful
    /// representation as `Self`.
    fn from_raw(raw: RawId) -> Result<Self>;

    /// The key as a statement parameter value.
    fn to_value(&self) -> Value;
}

impl IdKey for i32 {
    fn from_raw(raw: RawId) -> Result<Self> {
        match raw {
            RawId::Long(v) => Self::try_from(v)
                .map_err(|_| Error::Convert(format!("raw identity {v} exceeds i32 range"))),
            RawId::Text(v) => v
                .parse()
                .map_err(|_| Error::Convert(format!("raw identity '{v}' is not an i32"))),
        }
    }

    fn to_value(&self) -> Value {
        (*self).into()
    }
}

impl IdKey for i64 {
    fn from_raw(raw: RawId) -> Result<Self> {
        match raw {
            RawId::Long(v) => Ok(v),
            RawId::Text(v) => v
                .parse()
                .map_err(|_| Error::Convert(format!("raw identity '{v}' is not an i64"))),
        }
    }

    fn to_value(&self) -> Value {
        (*self).into()
    }
}

impl IdKey for String {
    fn from_raw(raw: RawId) -> Result<Self> {
        match raw {
            RawId::Long(v) => Ok(v.to_string()),
            RawId::Text(v) => Ok(v),
        }
    }

    fn to_value(&self) -> Value {
        self.clone().into()
    }
}

impl IdKey for Uuid {
    fn from_raw(raw: RawId) -> Result<Self> {
        match raw {
            RawId::Long(v) => {
                Err(Error::Convert(format!("numeric raw identity {v} cannot become a UUID")))
            }
            RawId::Text(v) => Self::parse_str(&v)
                .map_err(|_| Error::Convert(format!("raw identity '{v}' is not a UUID"))),
        }
    }

    fn to_value(&self) -> Value {
        (*self).into()
    }
}
