use serde::de::value::{BorrowedStrDeserializer, Error as DeError, SeqDeserializer};
use serde::de::{self, DeserializeOwned, DeserializeSeed, Deserializer, MapAccess, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::SqlNamedError;
use crate::results::CustomDbRow;
use crate::types::RowValues;

use super::FromRow;

/// A serde record scanned by column name.
///
/// Fields are matched against column names; extra columns are ignored and a missing
/// required field is a `ScanError`. Integer 0/1 columns fill `bool` fields, which is how
/// `SQLite` stores booleans.
///
/// ```rust
/// use serde::Deserialize;
/// use sql_named_ext::prelude::*;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// let mut dest: Vec<Record<User>> = Vec::new();
/// # let _ = &mut dest;
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record<T>(pub T);

impl<T> Record<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRow for Record<T> {
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlNamedError> {
        T::deserialize(RowDeserializer { row })
            .map(Record)
            .map_err(|e| SqlNamedError::scan(format!("cannot scan row into record: {e}")))
    }
}

/// Presents a row as a map of column name to value.
struct RowDeserializer<'a> {
    row: &'a CustomDbRow,
}

impl<'de> Deserializer<'de> for RowDeserializer<'de> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        visitor.visit_map(Columns {
            row: self.row,
            next: 0,
            value: None,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct Columns<'a> {
    row: &'a CustomDbRow,
    next: usize,
    value: Option<&'a RowValues>,
}

impl<'de> MapAccess<'de> for Columns<'de> {
    type Error = DeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DeError> {
        let row = self.row;
        while let Some(name) = row.column_names.get(self.next) {
            let idx = self.next;
            self.next += 1;
            // First occurrence of a repeated column name wins.
            if row.get_column_index(name) != Some(idx) {
                continue;
            }
            self.value = row.rows.get(idx);
            return seed
                .deserialize(BorrowedStrDeserializer::new(name.as_str()))
                .map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DeError> {
        let value = self
            .value
            .take()
            .ok_or_else(|| <DeError as de::Error>::custom("row has fewer values than columns"))?;
        seed.deserialize(ValueDeserializer(value))
    }
}

struct ValueDeserializer<'a>(&'a RowValues);

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = DeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.0 {
            RowValues::Int(i) => visitor.visit_i64(*i),
            RowValues::Float(f) => visitor.visit_f64(*f),
            RowValues::Text(s) => visitor.visit_borrowed_str(s),
            RowValues::Bool(b) => visitor.visit_bool(*b),
            RowValues::Timestamp(dt) => {
                visitor.visit_string(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            RowValues::Null => visitor.visit_unit(),
            RowValues::JSON(json) => json
                .deserialize_any(visitor)
                .map_err(<DeError as de::Error>::custom),
            RowValues::Blob(bytes) => visitor.visit_seq(SeqDeserializer::new(bytes.iter().copied())),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        match self.0.as_bool() {
            Some(b) => visitor.visit_bool(*b),
            None => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DeError> {
        if self.0.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DeError> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}
