use std::fmt;
use std::str::FromStr;

use rusqlite::types::Value as SqliteValue;
use serde::{Deserialize, Serialize};

use crate::error::SqliteWrapperError;

/// Scalar values that can be stored in a row or bound as statement inputs.
///
/// ```rust
/// use sqlite_wrapper::prelude::*;
///
/// let inputs = vec![Value::from(1), Value::from("alice"), Value::Null];
/// # let _ = inputs;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Integer value (64-bit)
    Integer(i64),
    /// Floating point value (64-bit)
    Real(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Real(_))
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// The storage class this value would be written with, `None` for NULL.
    #[must_use]
    pub fn base_type(&self) -> Option<BaseType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(BaseType::Integer),
            Value::Real(_) => Some(BaseType::Real),
            Value::Text(_) => Some(BaseType::Text),
            Value::Blob(_) => Some(BaseType::Blob),
        }
    }

    /// SQL literal form: text and blobs quoted, numbers bare.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Blob(bytes) => {
                let mut hex = String::with_capacity(bytes.len() * 2 + 3);
                hex.push_str("X'");
                for byte in bytes {
                    hex.push_str(&format!("{byte:02X}"));
                }
                hex.push('\'');
                hex
            }
        }
    }

    /// Diagnostic form used in query errors: strings quoted, everything else stringified.
    #[must_use]
    pub fn to_display_input(&self) -> String {
        match self {
            Value::Text(s) => format!("'{s}'"),
            Value::Blob(bytes) => format!("'{}'", String::from_utf8_lossy(bytes)),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<SqliteValue> for Value {
    fn from(value: SqliteValue) -> Self {
        match value {
            SqliteValue::Null => Value::Null,
            SqliteValue::Integer(i) => Value::Integer(i),
            SqliteValue::Real(f) => Value::Real(f),
            SqliteValue::Text(s) => Value::Text(s),
            SqliteValue::Blob(b) => Value::Blob(b),
        }
    }
}

impl From<&Value> for SqliteValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqliteValue::Null,
            Value::Integer(i) => SqliteValue::Integer(*i),
            Value::Real(f) => SqliteValue::Real(*f),
            Value::Text(s) => SqliteValue::Text(s.clone()),
            Value::Blob(b) => SqliteValue::Blob(b.clone()),
        }
    }
}

/// The four storage classes a column can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Text,
    Blob,
    Integer,
    Real,
}

impl BaseType {
    #[must_use]
    pub fn sql_name(self) -> &'static str {
        match self {
            BaseType::Text => "TEXT",
            BaseType::Blob => "BLOB",
            BaseType::Integer => "INTEGER",
            BaseType::Real => "REAL",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

impl FromStr for BaseType {
    type Err = SqliteWrapperError;

    /// Parses a declared column type as reported by `PRAGMA table_info`.
    fn from_str(declared: &str) -> Result<Self, Self::Err> {
        match declared.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Ok(BaseType::Text),
            "BLOB" => Ok(BaseType::Blob),
            "INTEGER" => Ok(BaseType::Integer),
            "REAL" => Ok(BaseType::Real),
            other => Err(SqliteWrapperError::type_error(format!(
                "'{other}' is an invalid data type"
            ))),
        }
    }
}

/// Right-hand side of an assignment in an `UPDATE`.
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    /// `col=?`
    Value(Value),
    /// `col=col+?`
    Increment(Value),
    /// `col=col || ?`
    Concatenate(String),
    /// `col=NULL`
    Null,
}

impl SetValue {
    /// Increment a numeric column; `increment(1)` mirrors a plain `+= 1`.
    pub fn increment(by: impl Into<Value>) -> Self {
        SetValue::Increment(by.into())
    }

    pub fn concatenate(suffix: impl Into<String>) -> Self {
        SetValue::Concatenate(suffix.into())
    }
}

impl From<Value> for SetValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SetValue::Null,
            other => SetValue::Value(other),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for SetValue {
    fn from(value: Option<T>) -> Self {
        SetValue::from(Value::from(value))
    }
}

macro_rules! set_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SetValue {
                fn from(value: $ty) -> Self {
                    SetValue::from(Value::from(value))
                }
            }
        )*
    };
}

set_value_from!(i64, i32, u32, bool, f64, &str, String, Vec<u8>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_quote_text_and_blobs_only() {
        assert_eq!(Value::from("it's").to_literal(), "'it''s'");
        assert_eq!(Value::from(vec![0x0a_u8, 0xff]).to_literal(), "X'0AFF'");
        assert_eq!(Value::from(42).to_literal(), "42");
        assert_eq!(Value::from(1.5).to_literal(), "1.5");
        assert_eq!(Value::Null.to_literal(), "NULL");
    }

    #[test]
    fn display_inputs_quote_strings() {
        assert_eq!(Value::from("a").to_display_input(), "'a'");
        assert_eq!(Value::from(3).to_display_input(), "3");
        assert_eq!(Value::Null.to_display_input(), "NULL");
    }

    #[test]
    fn declared_types_parse_case_insensitively() {
        assert_eq!("integer".parse::<BaseType>().unwrap(), BaseType::Integer);
        assert_eq!(" TEXT ".parse::<BaseType>().unwrap(), BaseType::Text);
        let err = "VARCHAR(20)".parse::<BaseType>().unwrap_err();
        assert!(matches!(err, SqliteWrapperError::Type(_)));
    }

    #[test]
    fn null_set_value_from_option() {
        assert_eq!(SetValue::from(None::<i64>), SetValue::Null);
        assert_eq!(SetValue::from(5), SetValue::Value(Value::Integer(5)));
    }
}
