//! Scan destinations.
//!
//! [`FromRow`] turns one row into a value and backs the single-row fetch. [`RowSink`] absorbs
//! a whole result set and backs the multi-row fetch. Scalars scan from single-column rows,
//! tuples from rows of matching width, and [`Record`] maps columns onto a serde record by
//! name.

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::SqlNamedError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

mod record;

pub use record::Record;

/// Convert one column value.
pub trait FromValue: Sized {
    /// # Errors
    ///
    /// Returns `SqlNamedError::ScanError` if the value cannot be represented as `Self`.
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError>;
}

/// Convert one row.
pub trait FromRow: Sized {
    /// # Errors
    ///
    /// Returns `SqlNamedError::ScanError` if the row's columns do not fit `Self`.
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlNamedError>;
}

/// Destination of a multi-row fetch.
pub trait RowSink: Send {
    /// # Errors
    ///
    /// Returns `SqlNamedError::ScanError` if a row cannot be stored.
    fn absorb(&mut self, rows: ResultSet) -> Result<(), SqlNamedError>;
}

fn mismatch(expected: &str, value: &RowValues) -> SqlNamedError {
    SqlNamedError::scan(format!("cannot scan {} value into {expected}", value.kind()))
}

impl FromValue for RowValues {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        match value {
            RowValues::Int(i) => Ok(*i),
            RowValues::Bool(b) => Ok(i64::from(*b)),
            other => Err(mismatch("i64", other)),
        }
    }
}

macro_rules! impl_narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        SqlNamedError::scan(format!(
                            "value {wide} out of range for {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_narrow_int!(i32, i16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        value.as_float().ok_or_else(|| mismatch("f64", value))
    }
}

impl FromValue for bool {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        value.as_bool().copied().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for String {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        match value {
            RowValues::Text(s) => Ok(s.clone()),
            RowValues::JSON(json) => Ok(json.to_string()),
            other => Err(mismatch("String", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        if let Some(bytes) = value.as_blob() {
            return Ok(bytes.to_vec());
        }
        match value {
            RowValues::Text(s) => Ok(s.as_bytes().to_vec()),
            other => Err(mismatch("Vec<u8>", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch("NaiveDateTime", value))
    }
}

impl FromValue for JsonValue {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        match value {
            RowValues::JSON(json) => Ok(json.clone()),
            RowValues::Text(s) => serde_json::from_str(s)
                .map_err(|e| SqlNamedError::scan(format!("text column is not JSON: {e}"))),
            other => Ok(value_to_json(other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &RowValues) -> Result<Self, SqlNamedError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

fn single_column(row: &CustomDbRow) -> Result<&RowValues, SqlNamedError> {
    match row.rows.as_slice() {
        [value] => Ok(value),
        values => Err(SqlNamedError::scan(format!(
            "scalar destination needs exactly 1 column, row has {}",
            values.len()
        ))),
    }
}

macro_rules! impl_scalar_from_row {
    ($($ty:ty),*) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: &CustomDbRow) -> Result<Self, SqlNamedError> {
                    <$ty as FromValue>::from_value(single_column(row)?)
                }
            }
        )*
    };
}

impl_scalar_from_row!(
    RowValues,
    i64,
    i32,
    i16,
    u32,
    u64,
    usize,
    f64,
    bool,
    String,
    Vec<u8>,
    NaiveDateTime,
    JsonValue
);

impl<T: FromValue> FromRow for Option<T> {
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlNamedError> {
        <Option<T> as FromValue>::from_value(single_column(row)?)
    }
}

macro_rules! impl_tuple_from_row {
    ($width:literal => $($name:ident : $idx:tt),+) => {
        impl<$($name: FromValue),+> FromRow for ($($name,)+) {
            fn from_row(row: &CustomDbRow) -> Result<Self, SqlNamedError> {
                if row.rows.len() != $width {
                    return Err(SqlNamedError::scan(format!(
                        "tuple destination needs {} columns, row has {}",
                        $width,
                        row.rows.len()
                    )));
                }
                Ok(($($name::from_value(&row.rows[$idx])?,)+))
            }
        }
    };
}

impl_tuple_from_row!(2 => A: 0, B: 1);
impl_tuple_from_row!(3 => A: 0, B: 1, C: 2);
impl_tuple_from_row!(4 => A: 0, B: 1, C: 2, D: 3);

impl FromRow for CustomDbRow {
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlNamedError> {
        Ok(row.clone())
    }
}

fn value_to_json(value: &RowValues) -> JsonValue {
    match value {
        RowValues::Int(i) => JsonValue::from(*i),
        RowValues::Float(f) => JsonValue::from(*f),
        RowValues::Text(s) => JsonValue::String(s.clone()),
        RowValues::Bool(b) => JsonValue::Bool(*b),
        RowValues::Timestamp(dt) => JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        RowValues::Null => JsonValue::Null,
        RowValues::JSON(json) => json.clone(),
        RowValues::Blob(bytes) => JsonValue::from(bytes.clone()),
    }
}

/// Multi-row destination that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl RowSink for Discard {
    fn absorb(&mut self, _rows: ResultSet) -> Result<(), SqlNamedError> {
        Ok(())
    }
}

/// Rows are appended after whatever the vector already holds.
impl<T: FromRow + Send> RowSink for Vec<T> {
    fn absorb(&mut self, rows: ResultSet) -> Result<(), SqlNamedError> {
        self.reserve(rows.len());
        for row in &rows.results {
            self.push(T::from_row(row)?);
        }
        Ok(())
    }
}

impl RowSink for ResultSet {
    fn absorb(&mut self, rows: ResultSet) -> Result<(), SqlNamedError> {
        *self = rows;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;

    fn row(cols: &[&str], values: Vec<RowValues>) -> CustomDbRow {
        CustomDbRow::new(
            Arc::new(cols.iter().map(|c| (*c).to_string()).collect()),
            values,
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        label: Option<String>,
    }

    #[test]
    fn scalar_needs_one_column() {
        let one = row(&["n"], vec![RowValues::Int(5)]);
        assert_eq!(i64::from_row(&one).unwrap(), 5);
        let two = row(&["a", "b"], vec![RowValues::Int(1), RowValues::Int(2)]);
        assert!(matches!(
            i64::from_row(&two),
            Err(SqlNamedError::ScanError(_))
        ));
    }

    #[test]
    fn type_mismatch_is_scan_error() {
        let r = row(&["n"], vec![RowValues::Text("x".into())]);
        assert!(matches!(i64::from_row(&r), Err(SqlNamedError::ScanError(_))));
        let null = row(&["n"], vec![RowValues::Null]);
        assert_eq!(Option::<i64>::from_row(&null).unwrap(), None);
    }

    #[test]
    fn tuples_scan_by_position() {
        let r = row(
            &["id", "name"],
            vec![RowValues::Int(1), RowValues::Text("a".into())],
        );
        let (id, name): (i64, String) = FromRow::from_row(&r).unwrap();
        assert_eq!((id, name.as_str()), (1, "a"));
        assert!(<(i64, String, bool)>::from_row(&r).is_err());
    }

    #[test]
    fn records_scan_by_name() {
        let r = row(
            &["label", "id", "extra"],
            vec![RowValues::Null, RowValues::Int(3), RowValues::Float(0.5)],
        );
        let Record(item) = Record::<Item>::from_row(&r).unwrap();
        assert_eq!(item, Item { id: 3, label: None });

        let missing = row(&["label"], vec![RowValues::Text("x".into())]);
        assert!(matches!(
            Record::<Item>::from_row(&missing),
            Err(SqlNamedError::ScanError(_))
        ));
    }

    #[test]
    fn blobs_and_text_scan_as_bytes() {
        let blob = row(&["b"], vec![RowValues::Blob(vec![1, 2])]);
        assert_eq!(Vec::<u8>::from_row(&blob).unwrap(), vec![1, 2]);
        let text = row(&["b"], vec![RowValues::Text("hi".into())]);
        assert_eq!(Vec::<u8>::from_row(&text).unwrap(), b"hi".to_vec());
        let int = row(&["b"], vec![RowValues::Int(1)]);
        assert!(Vec::<u8>::from_row(&int).is_err());
    }

    #[test]
    fn vec_sink_appends() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["n".to_string()]));
        rs.add_row_values(vec![RowValues::Int(1)]);
        rs.add_row_values(vec![RowValues::Int(2)]);

        let mut dest = vec![0_i64];
        dest.absorb(rs).unwrap();
        assert_eq!(dest, vec![0, 1, 2]);
    }
}
