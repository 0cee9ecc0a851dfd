//! Named parameter sources.
//!
//! A [`NamedParams`] maps placeholder names to values. Build one directly, with the
//! [`named_params!`](crate::named_params) macro, or from any `serde::Serialize` record:
//!
//! ```rust
//! use serde::Serialize;
//! use sql_named_ext::prelude::*;
//!
//! #[derive(Serialize)]
//! struct Filter {
//!     name: String,
//!     #[serde(rename = "min_age")]
//!     age: i64,
//! }
//!
//! let from_macro = named_params! { "name" => "alice", "min_age" => 30 };
//! let from_record = NamedParams::from_record(&Filter { name: "alice".into(), age: 30 })?;
//! assert_eq!(from_macro, from_record);
//! # Ok::<(), SqlNamedError>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::SqlNamedError;
use crate::types::{ParamValue, RowValues};

pub(crate) mod compile;

/// Name -> value lookup consumed while binding a named query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    values: HashMap<String, ParamValue>,
}

impl NamedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameter set used when a caller passes no source at all.
    #[must_use]
    pub fn empty() -> &'static NamedParams {
        static EMPTY: std::sync::LazyLock<NamedParams> = std::sync::LazyLock::new(NamedParams::new);
        &EMPTY
    }

    /// Add or replace a value, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a parameter set from a serializable record.
    ///
    /// Field names (after serde renames) become parameter names. Nested objects stay
    /// bindable as JSON under their field name and are also reachable through dotted
    /// names such as `owner.id`.
    ///
    /// # Errors
    ///
    /// Returns `SqlNamedError::BindError` if the record fails to serialize or does not
    /// serialize to an object (a bare scalar, sequence or unit is not a parameter source).
    pub fn from_record<T: Serialize + ?Sized>(record: &T) -> Result<Self, SqlNamedError> {
        let value = serde_json::to_value(record)
            .map_err(|e| SqlNamedError::bind(format!("cannot serialize parameter source: {e}")))?;
        Self::try_from(value)
    }

    fn absorb_object(&mut self, prefix: Option<&str>, object: Map<String, JsonValue>) {
        for (key, value) in object {
            let name = match prefix {
                Some(prefix) => format!("{prefix}.{key}"),
                None => key,
            };
            if let JsonValue::Object(inner) = &value {
                self.absorb_object(Some(&name), inner.clone());
            }
            self.values.insert(name, json_to_param(value));
        }
    }
}

impl TryFrom<JsonValue> for NamedParams {
    type Error = SqlNamedError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Object(object) => {
                let mut params = NamedParams::new();
                params.absorb_object(None, object);
                Ok(params)
            }
            other => Err(SqlNamedError::bind(format!(
                "unsupported parameter source shape: expected a record or map, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for NamedParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = NamedParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<K, V> From<HashMap<K, V>> for NamedParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V> From<BTreeMap<K, V>> for NamedParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "sequence",
        JsonValue::Object(_) => "object",
    }
}

fn json_to_param(value: JsonValue) -> ParamValue {
    match value {
        JsonValue::Array(items) => ParamValue::List(items.into_iter().map(json_to_scalar).collect()),
        other => ParamValue::Single(json_to_scalar(other)),
    }
}

fn json_to_scalar(value: JsonValue) -> RowValues {
    match value {
        JsonValue::Null => RowValues::Null,
        JsonValue::Bool(b) => RowValues::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => RowValues::Int(i),
            None => n.as_f64().map_or(RowValues::JSON(JsonValue::Number(n)), RowValues::Float),
        },
        JsonValue::String(s) => RowValues::Text(s),
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => RowValues::JSON(nested),
    }
}

/// Build a [`NamedParams`] from `name => value` pairs.
///
/// ```rust
/// use sql_named_ext::prelude::*;
///
/// let params = named_params! {
///     "id" => 7,
///     "tags" => ParamValue::list(["a", "b"]),
/// };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! named_params {
    () => {
        $crate::named::NamedParams::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::named::NamedParams::new();
        $(params.insert($name, $value);)+
        params
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Owner {
        id: i64,
    }

    #[derive(Serialize)]
    struct Pet {
        name: String,
        #[serde(rename = "pet_ids")]
        ids: Vec<i64>,
        weight: f64,
        nickname: Option<String>,
        owner: Owner,
    }

    #[test]
    fn record_fields_become_names() {
        let pet = Pet {
            name: "rex".into(),
            ids: vec![1, 2],
            weight: 4.5,
            nickname: None,
            owner: Owner { id: 9 },
        };
        let params = NamedParams::from_record(&pet).unwrap();
        assert_eq!(params.get("name"), Some(&ParamValue::from("rex")));
        assert_eq!(params.get("pet_ids"), Some(&ParamValue::list([1_i64, 2])));
        assert_eq!(params.get("weight"), Some(&ParamValue::from(4.5)));
        assert_eq!(params.get("nickname"), Some(&ParamValue::Single(RowValues::Null)));
        assert_eq!(params.get("owner.id"), Some(&ParamValue::from(9_i64)));
        assert_eq!(
            params.get("owner"),
            Some(&ParamValue::Single(RowValues::JSON(json!({"id": 9}))))
        );
    }

    #[test]
    fn maps_are_sources() {
        let mut map = HashMap::new();
        map.insert("a", 1_i64);
        let params = NamedParams::from(map);
        assert_eq!(params.get("a"), Some(&ParamValue::from(1_i64)));
    }

    #[test]
    fn non_object_shapes_are_rejected() {
        for bad in [json!(1), json!([1, 2]), json!(null), json!("x")] {
            let err = NamedParams::try_from(bad).unwrap_err();
            assert!(matches!(err, SqlNamedError::BindError(_)), "{err}");
        }
        let err = NamedParams::from_record(&vec![1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("sequence"));
    }

    #[test]
    fn macro_builds_params() {
        let params = crate::named_params! { "id" => 1, "name" => "bob" };
        assert_eq!(params.len(), 2);
        assert!(crate::named_params! {}.is_empty());
    }
}
