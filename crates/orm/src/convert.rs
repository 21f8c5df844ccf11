//! Bidirectional value conversion between in-memory types and column
//! representations.
//!
//! One [`Converter`] per dialect, selected at wiring time. Outbound it turns
//! statement parameters into boundary values; inbound it reads typed values
//! back out of returned rows. Dialect differences live here and nowhere
//! else: booleans travel as integers on MySQL and SQLite, timestamps render
//! as RFC 3339 except on MySQL, UUIDs and JSON travel as text everywhere.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_query::Value;
use tabula_sql::{DbValue, Row};
use uuid::Uuid;

use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// Converts values crossing the database boundary for one dialect.
#[derive(Clone, Copy, Debug)]
pub struct Converter {
    dialect: Dialect,
}

impl Converter {
    /// A converter for the given dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect this converter serves.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Convert an ordered parameter list into boundary values. Ordering is
    /// preserved; it must match placeholder ordering in the statement text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] for any value with no column
    /// representation in this dialect.
    pub fn to_params(&self, values: impl IntoIterator<Item = Value>) -> Result<Vec<DbValue>> {
        values.into_iter().map(|value| self.to_param(value)).collect()
    }

    /// Convert a single parameter value into its boundary representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] for an unmapped value kind.
    pub fn to_param(&self, value: Value) -> Result<DbValue> {
        let converted = match value {
            Value::Bool(v) => match self.dialect {
                Dialect::Postgres => DbValue::Bool(v),
                Dialect::MySql | Dialect::Sqlite => DbValue::Int(v.map(i32::from)),
            },
            Value::TinyInt(v) => DbValue::Int(v.map(i32::from)),
            Value::SmallInt(v) => DbValue::Int(v.map(i32::from)),
            Value::Int(v) => DbValue::Int(v),
            Value::BigInt(v) => DbValue::Long(v),
            Value::TinyUnsigned(v) => DbValue::Uint(v.map(u32::from)),
            Value::SmallUnsigned(v) => DbValue::Uint(v.map(u32::from)),
            Value::Unsigned(v) => DbValue::Uint(v),
            Value::BigUnsigned(v) => DbValue::Ulong(v),
            Value::Float(v) => DbValue::Float(v),
            Value::Double(v) => DbValue::Double(v),
            Value::String(v) => DbValue::Text(v.map(|value| *value)),
            Value::Char(v) => DbValue::Text(v.map(|ch| ch.to_string())),
            Value::Bytes(v) => DbValue::Bytes(v.map(|bytes| *bytes)),
            Value::ChronoDate(v) => DbValue::Date(v.map(|date| date.to_string())),
            Value::ChronoTime(v) => DbValue::Time(v.map(|time| time.to_string())),
            Value::ChronoDateTime(v) => DbValue::Timestamp(v.map(|dt| dt.to_string())),
            Value::ChronoDateTimeUtc(v) => DbValue::Timestamp(v.map(|dt| match self.dialect {
                Dialect::MySql => dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
                Dialect::Postgres | Dialect::Sqlite => dt.to_rfc3339(),
            })),
            Value::Uuid(v) => DbValue::Text(v.map(|id| id.to_string())),
            Value::Json(v) => DbValue::Text(v.map(|json| json.to_string())),
            _ => {
                return Err(Error::Convert(
                    "unsupported value kind requires explicit conversion before it can cross the database boundary".to_string(),
                ));
            }
        };
        Ok(converted)
    }

    fn field<'a>(&self, row: &'a Row, col: &str) -> Result<&'a DbValue> {
        row.field(col).ok_or_else(|| Error::Convert(format!("missing column '{col}'")))
    }

    /// Read a boolean column. MySQL and SQLite report booleans as 0/1
    /// integers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column or mismatched value.
    pub fn read_bool(&self, row: &Row, col: &str) -> Result<bool> {
        match self.field(row, col)? {
            DbValue::Bool(Some(v)) => Ok(*v),
            DbValue::Int(Some(v)) if self.dialect != Dialect::Postgres => {
                int_bool(i64::from(*v), col)
            }
            DbValue::Long(Some(v)) if self.dialect != Dialect::Postgres => int_bool(*v, col),
            other => Err(mismatch(col, "boolean", other)),
        }
    }

    /// Read a 32-bit integer column, narrowing wider integers with a range
    /// check.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// out-of-range narrow.
    pub fn read_i32(&self, row: &Row, col: &str) -> Result<i32> {
        match self.field(row, col)? {
            DbValue::Int(Some(v)) => Ok(*v),
            DbValue::Long(Some(v)) => i32::try_from(*v).map_err(|_| range(col, *v)),
            DbValue::Uint(Some(v)) => i32::try_from(*v).map_err(|_| range(col, i64::from(*v))),
            other => Err(mismatch(col, "int32", other)),
        }
    }

    /// Read a 64-bit integer column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column or mismatched value.
    pub fn read_i64(&self, row: &Row, col: &str) -> Result<i64> {
        match self.field(row, col)? {
            DbValue::Int(Some(v)) => Ok(i64::from(*v)),
            DbValue::Long(Some(v)) => Ok(*v),
            DbValue::Uint(Some(v)) => Ok(i64::from(*v)),
            DbValue::Ulong(Some(v)) => {
                i64::try_from(*v).map_err(|_| Error::Convert(format!(
                    "column '{col}': value {v} exceeds i64 range"
                )))
            }
            other => Err(mismatch(col, "int64", other)),
        }
    }

    /// Read a 32-bit unsigned integer column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// negative/out-of-range value.
    pub fn read_u32(&self, row: &Row, col: &str) -> Result<u32> {
        match self.field(row, col)? {
            DbValue::Uint(Some(v)) => Ok(*v),
            DbValue::Int(Some(v)) => u32::try_from(*v).map_err(|_| range(col, i64::from(*v))),
            DbValue::Long(Some(v)) => u32::try_from(*v).map_err(|_| range(col, *v)),
            other => Err(mismatch(col, "uint32", other)),
        }
    }

    /// Read a 64-bit unsigned integer column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// negative value.
    pub fn read_u64(&self, row: &Row, col: &str) -> Result<u64> {
        match self.field(row, col)? {
            DbValue::Ulong(Some(v)) => Ok(*v),
            DbValue::Uint(Some(v)) => Ok(u64::from(*v)),
            DbValue::Int(Some(v)) => u64::try_from(*v).map_err(|_| range(col, i64::from(*v))),
            DbValue::Long(Some(v)) => u64::try_from(*v).map_err(|_| range(col, *v)),
            other => Err(mismatch(col, "uint64", other)),
        }
    }

    /// Read a 32-bit float column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column or mismatched value.
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_f32(&self, row: &Row, col: &str) -> Result<f32> {
        match self.field(row, col)? {
            DbValue::Float(Some(v)) => Ok(*v),
            DbValue::Double(Some(v)) => Ok(*v as f32),
            other => Err(mismatch(col, "float", other)),
        }
    }

    /// Read a 64-bit float column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column or mismatched value.
    pub fn read_f64(&self, row: &Row, col: &str) -> Result<f64> {
        match self.field(row, col)? {
            DbValue::Double(Some(v)) => Ok(*v),
            DbValue::Float(Some(v)) => Ok(f64::from(*v)),
            other => Err(mismatch(col, "double", other)),
        }
    }

    /// Read a text column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column or mismatched value.
    pub fn read_text(&self, row: &Row, col: &str) -> Result<String> {
        match self.field(row, col)? {
            DbValue::Text(Some(v)) => Ok(v.clone()),
            other => Err(mismatch(col, "text", other)),
        }
    }

    /// Read a binary column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column or mismatched value.
    pub fn read_bytes(&self, row: &Row, col: &str) -> Result<Vec<u8>> {
        match self.field(row, col)? {
            DbValue::Bytes(Some(v)) => Ok(v.clone()),
            other => Err(mismatch(col, "binary", other)),
        }
    }

    /// Read a timestamp column. Accepts RFC 3339 and the space-separated
    /// `%Y-%m-%d %H:%M:%S%.f` form, which between them cover every dialect
    /// this crate writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// unparseable timestamp text.
    pub fn read_timestamp(&self, row: &Row, col: &str) -> Result<DateTime<Utc>> {
        match self.field(row, col)? {
            DbValue::Timestamp(Some(raw)) | DbValue::Text(Some(raw)) => {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                    return Ok(parsed.with_timezone(&Utc));
                }
                if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
                    return Ok(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc));
                }
                Err(Error::Convert(format!(
                    "column '{col}': unsupported timestamp '{raw}'; expected RFC 3339 or \"%Y-%m-%d %H:%M:%S%.f\""
                )))
            }
            other => Err(mismatch(col, "timestamp", other)),
        }
    }

    /// Read a date column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// unparseable date text.
    pub fn read_date(&self, row: &Row, col: &str) -> Result<NaiveDate> {
        match self.field(row, col)? {
            DbValue::Date(Some(raw)) | DbValue::Text(Some(raw)) => {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    Error::Convert(format!(
                        "column '{col}': unsupported date '{raw}'; expected \"%Y-%m-%d\""
                    ))
                })
            }
            other => Err(mismatch(col, "date", other)),
        }
    }

    /// Read a time-of-day column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// unparseable time text.
    pub fn read_time(&self, row: &Row, col: &str) -> Result<NaiveTime> {
        match self.field(row, col)? {
            DbValue::Time(Some(raw)) | DbValue::Text(Some(raw)) => {
                NaiveTime::parse_from_str(raw, "%H:%M:%S%.f").map_err(|_| {
                    Error::Convert(format!(
                        "column '{col}': unsupported time '{raw}'; expected \"%H:%M:%S%.f\""
                    ))
                })
            }
            other => Err(mismatch(col, "time", other)),
        }
    }

    /// Read a UUID column stored as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// malformed UUID text.
    pub fn read_uuid(&self, row: &Row, col: &str) -> Result<Uuid> {
        let raw = self.read_text(row, col)?;
        Uuid::parse_str(&raw)
            .map_err(|_| Error::Convert(format!("column '{col}': '{raw}' is not a UUID")))
    }

    /// Read a JSON column stored as text or binary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] on a missing column, mismatched value, or
    /// malformed JSON.
    pub fn read_json(&self, row: &Row, col: &str) -> Result<serde_json::Value> {
        match self.field(row, col)? {
            DbValue::Text(Some(raw)) => serde_json::from_str(raw)
                .map_err(|err| Error::Convert(format!("column '{col}': invalid json: {err}"))),
            DbValue::Bytes(Some(raw)) => serde_json::from_slice(raw)
                .map_err(|err| Error::Convert(format!("column '{col}': invalid json: {err}"))),
            other => Err(mismatch(col, "json", other)),
        }
    }
}

fn int_bool(value: i64, col: &str) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::Convert(format!("column '{col}': {other} is not a boolean"))),
    }
}

fn mismatch(col: &str, expected: &str, got: &DbValue) -> Error {
    Error::Convert(format!("column '{col}': expected {expected}, got {got:?}"))
}

fn range(col: &str, value: i64) -> Error {
    Error::Convert(format!("column '{col}': value {value} is out of range"))
}

/// Types that can be fetched from a returned row by column name.
///
/// Implemented for the standard field types; entity `from_row`
/// implementations are built from these.
pub trait FromDb: Sized {
    /// Fetch a value from a row by column name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Convert`] when the column is missing or its value
    /// cannot become `Self`.
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self>;
}

impl FromDb for bool {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_bool(row, col)
    }
}

impl FromDb for i32 {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_i32(row, col)
    }
}

impl FromDb for i64 {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_i64(row, col)
    }
}

impl FromDb for u32 {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_u32(row, col)
    }
}

impl FromDb for u64 {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_u64(row, col)
    }
}

impl FromDb for f32 {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_f32(row, col)
    }
}

impl FromDb for f64 {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_f64(row, col)
    }
}

impl FromDb for String {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_text(row, col)
    }
}

impl FromDb for Vec<u8> {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_bytes(row, col)
    }
}

impl FromDb for DateTime<Utc> {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_timestamp(row, col)
    }
}

impl FromDb for NaiveDate {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_date(row, col)
    }
}

impl FromDb for NaiveTime {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_time(row, col)
    }
}

impl FromDb for Uuid {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_uuid(row, col)
    }
}

impl FromDb for serde_json::Value {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        conv.read_json(row, col)
    }
}

impl<T: FromDb> FromDb for Option<T> {
    fn fetch(conv: &Converter, row: &Row, col: &str) -> Result<Self> {
        match row.field(col) {
            Some(value) if !value.is_null() => Ok(Some(T::fetch(conv, row, col)?)),
            _ => Ok(None),
        }
    }
}
