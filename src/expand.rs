use crate::error::SqlNamedError;
use crate::translation::scanner::{Visit, rewrite_code};
use crate::types::{ParamValue, RowValues};

/// Expand list arguments of a `?`-placeholder query into one placeholder per element.
///
/// `WHERE id IN (?)` with a three-element list becomes `WHERE id IN (?, ?, ?)` and the list
/// contributes three arguments at its position. Scalars pass through unchanged, and when no
/// argument is a list the query is returned as is.
///
/// # Errors
///
/// Returns `SqlNamedError::BindError` if a list is empty or if the number of placeholders
/// does not match the number of arguments.
pub fn expand_in(
    sql: &str,
    args: Vec<ParamValue>,
) -> Result<(String, Vec<RowValues>), SqlNamedError> {
    let mut flat_len = 0;
    for (pos, arg) in args.iter().enumerate() {
        match arg {
            ParamValue::Single(_) => flat_len += 1,
            ParamValue::List(items) if items.is_empty() => {
                return Err(SqlNamedError::bind(format!(
                    "empty list passed for argument {} of an IN clause",
                    pos + 1
                )));
            }
            ParamValue::List(items) => flat_len += items.len(),
        }
    }

    if !args.iter().any(ParamValue::is_list) {
        let flat = args
            .into_iter()
            .filter_map(|arg| match arg {
                ParamValue::Single(v) => Some(v),
                ParamValue::List(_) => None,
            })
            .collect();
        return Ok((sql.to_string(), flat));
    }

    let mut pending = args.iter();
    let mut seen = 0;
    let expanded = rewrite_code(sql, |bytes, idx, out| {
        if bytes[idx] != b'?' {
            return Ok(Visit::Pass);
        }
        seen += 1;
        let width = match pending.next() {
            Some(ParamValue::List(items)) => items.len(),
            Some(ParamValue::Single(_)) => 1,
            None => {
                return Err(SqlNamedError::bind(format!(
                    "query has more placeholders than the {} arguments supplied",
                    args.len()
                )));
            }
        };
        for i in 0..width {
            if i > 0 {
                out.extend_from_slice(b", ");
            }
            out.push(b'?');
        }
        Ok(Visit::Consumed(idx + 1))
    })?;

    if seen != args.len() {
        return Err(SqlNamedError::bind(format!(
            "query has {seen} placeholders but {} arguments were supplied",
            args.len()
        )));
    }

    let mut flat = Vec::with_capacity(flat_len);
    for arg in args {
        match arg {
            ParamValue::Single(v) => flat.push(v),
            ParamValue::List(items) => flat.extend(items),
        }
    }
    Ok((expanded, flat))
}
