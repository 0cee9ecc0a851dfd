use crate::error::SqlNamedError;
use crate::expand::expand_in;
use crate::named::NamedParams;
use crate::named::compile::compile_named;
use crate::translation::{PlaceholderStyle, rebind};
use crate::types::RowValues;

/// A named query lowered to a driver's native positional syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub args: Vec<RowValues>,
}

/// Bind a named query for a driver using `style` placeholders.
///
/// A missing parameter source is treated as an empty one, so statements without
/// placeholders never fail because nothing was passed. The pipeline is: named
/// placeholders to `?` (consuming values by name), list expansion for `IN` clauses,
/// then rebind to `style`.
///
/// `::` is always copied through as written, so `:id::text` binds `id` and keeps the
/// PostgreSQL cast; it is never collapsed into a single literal `:`.
///
/// # Errors
///
/// Returns `SqlNamedError::BindError` if a placeholder names a value the source does not
/// hold, or if list expansion fails (empty list, placeholder/argument mismatch).
///
/// ```rust
/// use sql_named_ext::prelude::*;
///
/// let params = named_params! { "ids" => ParamValue::list([1, 2, 3]), "flag" => true };
/// let bound = bind_named(
///     "UPDATE t SET flag = :flag WHERE id IN (:ids)",
///     Some(&params),
///     PlaceholderStyle::Dollar,
/// )?;
/// assert_eq!(bound.sql, "UPDATE t SET flag = $1 WHERE id IN ($2, $3, $4)");
/// assert_eq!(bound.args.len(), 4);
/// # Ok::<(), SqlNamedError>(())
/// ```
pub fn bind_named(
    query: &str,
    params: Option<&NamedParams>,
    style: PlaceholderStyle,
) -> Result<BoundQuery, SqlNamedError> {
    let params = params.unwrap_or(NamedParams::empty());

    let compiled = compile_named(query)?;
    let args = compiled
        .names
        .iter()
        .map(|name| {
            params.get(name).cloned().ok_or_else(|| {
                SqlNamedError::bind(format!("could not find name {name} in parameter source"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (expanded, args) = expand_in(&compiled.sql, args)?;
    let sql = rebind(&expanded, style)?.into_owned();

    Ok(BoundQuery { sql, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::named_params;
    use crate::types::ParamValue;

    #[test]
    fn absent_source_is_empty() {
        let bound = bind_named("DELETE FROM t", None, PlaceholderStyle::Dollar).unwrap();
        assert_eq!(bound.sql, "DELETE FROM t");
        assert!(bound.args.is_empty());
    }

    #[test]
    fn absent_source_with_placeholder_names_the_gap() {
        let err = bind_named("DELETE FROM t WHERE id = :id", None, PlaceholderStyle::Dollar)
            .unwrap_err();
        assert!(matches!(err, SqlNamedError::BindError(_)));
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn in_clause_expands_to_three() {
        let params = named_params! { "ids" => ParamValue::list([30_i64, 10, 20]) };
        let bound = bind_named(
            "SELECT name FROM t WHERE id IN (:ids)",
            Some(&params),
            PlaceholderStyle::NumberedQuestion,
        )
        .unwrap();
        assert_eq!(bound.sql, "SELECT name FROM t WHERE id IN (?1, ?2, ?3)");
        assert_eq!(
            bound.args,
            vec![RowValues::Int(30), RowValues::Int(10), RowValues::Int(20)]
        );
    }

    #[test]
    fn arg_count_matches_scalars_after_expansion() {
        let params = named_params! {
            "a" => 1,
            "b" => ParamValue::list(["x", "y"]),
            "c" => ParamValue::list([1.5, 2.5, 3.5, 4.5]),
        };
        let bound = bind_named(
            "SELECT * FROM t WHERE a = :a AND b IN (:b) AND c IN (:c) AND a2 = :a",
            Some(&params),
            PlaceholderStyle::Dollar,
        )
        .unwrap();
        assert_eq!(bound.args.len(), 1 + 2 + 4 + 1);
        assert_eq!(bound.sql.matches('$').count(), bound.args.len());
        assert!(bound.sql.ends_with("a2 = $8"));
    }

    fn bind_owned_source(id: i64) -> Result<BoundQuery, SqlNamedError> {
        let params = named_params! { "id" => id };
        bind_named("SELECT * FROM t WHERE id = :id::int8", Some(&params), PlaceholderStyle::Dollar)
    }

    #[test]
    fn borrowed_source_need_not_outlive_the_call() {
        let bound = bind_owned_source(5).unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE id = $1::int8");
        assert_eq!(bound.args, vec![RowValues::Int(5)]);
    }

    #[test]
    fn empty_list_fails_fast() {
        let params = named_params! { "ids" => ParamValue::List(Vec::new()) };
        let err = bind_named(
            "SELECT * FROM t WHERE id IN (:ids)",
            Some(&params),
            PlaceholderStyle::Dollar,
        )
        .unwrap_err();
        assert!(matches!(err, SqlNamedError::BindError(_)));
    }
}
