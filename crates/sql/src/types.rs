//! Wire types crossing the execution boundary.

/// A single value crossing the database boundary, tagged with its column
/// representation. Each variant carries an `Option` so typed NULLs survive
/// the trip in both directions.
///
/// Temporal values travel as formatted strings; the storage core's converter
/// decides the format per dialect.
#[derive(Clone, Debug, PartialEq)]
pub enum DbValue {
    /// Boolean column value.
    Bool(Option<bool>),
    /// 32-bit signed integer column value.
    Int(Option<i32>),
    /// 64-bit signed integer column value.
    Long(Option<i64>),
    /// 32-bit unsigned integer column value.
    Uint(Option<u32>),
    /// 64-bit unsigned integer column value.
    Ulong(Option<u64>),
    /// 32-bit float column value.
    Float(Option<f32>),
    /// 64-bit float column value.
    Double(Option<f64>),
    /// Text column value.
    Text(Option<String>),
    /// Binary column value.
    Bytes(Option<Vec<u8>>),
    /// Date column value, formatted.
    Date(Option<String>),
    /// Time column value, formatted.
    Time(Option<String>),
    /// Timestamp column value, formatted.
    Timestamp(Option<String>),
}

impl DbValue {
    /// Whether this value is a typed NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(
            self,
            Self::Bool(None)
                | Self::Int(None)
                | Self::Long(None)
                | Self::Uint(None)
                | Self::Ulong(None)
                | Self::Float(None)
                | Self::Double(None)
                | Self::Text(None)
                | Self::Bytes(None)
                | Self::Date(None)
                | Self::Time(None)
                | Self::Timestamp(None)
        )
    }
}

/// One named column value within a returned row.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Column name as returned by the backend.
    pub name: String,
    /// The column value.
    pub value: DbValue,
}

/// One row returned by the execution boundary. Consumed exactly once by the
/// storage core's mapper.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    /// Ordered column values.
    pub fields: Vec<Field>,
}

impl Row {
    /// Look up a column value by name. Columns the caller does not ask for
    /// are simply never touched, which is what makes additive schema changes
    /// safe for decoders.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DbValue> {
        self.fields.iter().find(|field| field.name == name).map(|field| &field.value)
    }
}

/// The raw identity value a backend returns when an insert generates one.
/// The storage core converts this into the entity's typed identity; nothing
/// else interprets it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawId {
    /// Numeric identity (auto-increment, sequence, rowid).
    Long(i64),
    /// Textual identity (string key, UUID rendered as text).
    Text(String),
}
