use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde_json::Value as JsonValue;

use crate::translation::PlaceholderStyle;

/// Values that can be stored in a database row or bound as a positional argument.
///
/// Reuse the same enum across backends so helper functions do not need to branch on driver
/// types:
/// ```rust
/// use sql_named_ext::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // SQLite stores timestamps as text
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Short type label used in scan and bind error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "int",
            RowValues::Float(_) => "float",
            RowValues::Text(_) => "text",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::Null => "null",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "blob",
        }
    }
}

macro_rules! impl_row_value_from {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for RowValues {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )*
    };
}

impl_row_value_from! {
    i64 => |v| RowValues::Int(v),
    i32 => |v| RowValues::Int(i64::from(v)),
    i16 => |v| RowValues::Int(i64::from(v)),
    u32 => |v| RowValues::Int(i64::from(v)),
    f64 => |v| RowValues::Float(v),
    f32 => |v| RowValues::Float(f64::from(v)),
    bool => |v| RowValues::Bool(v),
    String => |v| RowValues::Text(v),
    &str => |v| RowValues::Text(v.to_string()),
    NaiveDateTime => |v| RowValues::Timestamp(v),
    JsonValue => |v| RowValues::JSON(v),
    Vec<u8> => |v| RowValues::Blob(v),
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// A named argument: either one scalar or a list destined for an `IN (...)` clause.
///
/// Lists are expanded into one positional placeholder per element while binding;
/// `Blob` stays a single scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Single(RowValues),
    List(Vec<RowValues>),
}

impl ParamValue {
    /// Build a list argument from anything convertible to `RowValues`.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RowValues>,
    {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, ParamValue::List(_))
    }
}

macro_rules! impl_param_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Single(value.into())
                }
            }
        )*
    };
}

impl_param_value_from!(
    i64,
    i32,
    i16,
    u32,
    f64,
    f32,
    bool,
    String,
    &str,
    NaiveDateTime,
    JsonValue,
    Vec<u8>,
    RowValues,
);

impl<T: Into<RowValues>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        ParamValue::Single(value.into())
    }
}

/// Database drivers whose placeholder convention is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseType {
    /// `PostgreSQL` (`$1`)
    Postgres,
    /// `SQLite` (`?1`)
    Sqlite,
    /// `MySQL` / `MariaDB` (`?`)
    Mysql,
    /// SQL Server (`@p1`)
    Mssql,
    /// Oracle (`:arg1`)
    Oracle,
}

impl DatabaseType {
    /// Native positional placeholder style for this driver.
    #[must_use]
    pub fn placeholder_style(self) -> PlaceholderStyle {
        match self {
            DatabaseType::Postgres => PlaceholderStyle::Dollar,
            DatabaseType::Sqlite => PlaceholderStyle::NumberedQuestion,
            DatabaseType::Mysql => PlaceholderStyle::Question,
            DatabaseType::Mssql => PlaceholderStyle::AtP,
            DatabaseType::Oracle => PlaceholderStyle::Colon,
        }
    }
}
