use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A single SQL value: a dispatch argument, or a column read back by the materializer.
///
/// | variant | escaped as | typical MySQL column |
/// |---|---|---|
/// | `Int` | decimal | `INT`, `BIGINT` |
/// | `Float` | shortest round-trip form | `DOUBLE` |
/// | `Text` | quoted string | `VARCHAR`, `TEXT` |
/// | `Bool` | `1` / `0` | `TINYINT(1)` |
/// | `Timestamp` | `'YYYY-MM-DD HH:MM:SS[.ffffff]'` | `DATETIME` |
/// | `Null` | `NULL` | any nullable column |
/// | `JSON` | quoted JSON text | `JSON` |
/// | `Blob` | `X'..'` hex literal | `BLOB`, `VARBINARY` |
///
/// ```rust
/// use sql_reactor::prelude::*;
///
/// let args: Vec<RowValues> = vec![7i64.into(), "ann".into(), None::<i64>.into()];
/// assert!(args[2].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Null,
    JSON(JsonValue),
    Blob(Vec<u8>),
}

/// MySQL `DATETIME` text, with and without fractional seconds.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

impl RowValues {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, RowValues::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        match self {
            RowValues::Int(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RowValues::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// `TINYINT(1)` columns come back as `Int(0)` / `Int(1)`; both read as booleans.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(b) => Some(*b),
            RowValues::Int(1) => Some(true),
            RowValues::Int(0) => Some(false),
            _ => None,
        }
    }

    /// A `Timestamp`, or `Text` holding a `DATETIME` string.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            RowValues::Timestamp(ts) => Some(*ts),
            RowValues::Text(s) => DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            RowValues::Blob(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Transport handle a driver exposes to the event loop (a raw file descriptor on unix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor(pub i32);

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fd {}", self.0)
    }
}

/// Readiness event a handler is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    /// Data is available to read.
    Readable,
    /// The transport can accept more bytes.
    Writable,
}

/// Result shape a dispatched statement expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// At most one row.
    Item,
    /// Every row, in order.
    Collection,
    /// Auto-generated id of the last insert.
    LastInsertId,
    /// Number of affected rows.
    RowCount,
}
