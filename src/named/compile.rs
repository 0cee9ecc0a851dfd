use crate::error::SqlNamedError;
use crate::translation::scanner::{Visit, is_name_byte, rewrite_code};

/// A named query lowered to bare `?` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledQuery {
    pub(crate) sql: String,
    /// One entry per placeholder, in order of appearance (repeats included).
    pub(crate) names: Vec<String>,
}

/// Replace every `:name` in code positions with `?`.
///
/// `::` is copied through so PostgreSQL casts keep working, and a `:` that is not followed
/// by a name character is left as is. Dots are allowed inside a name (`:owner.id`) but
/// never end one.
pub(crate) fn compile_named(sql: &str) -> Result<CompiledQuery, SqlNamedError> {
    let mut names = Vec::new();
    let sql = rewrite_code(sql, |bytes, idx, out| {
        if bytes[idx] != b':' {
            return Ok(Visit::Pass);
        }
        if bytes.get(idx + 1) == Some(&b':') {
            out.extend_from_slice(b"::");
            return Ok(Visit::Consumed(idx + 2));
        }

        let start = idx + 1;
        let mut end = start;
        while end < bytes.len() {
            let b = bytes[end];
            let dotted = b == b'.' && bytes.get(end + 1).is_some_and(|n| is_name_byte(*n));
            if is_name_byte(b) || (dotted && end > start) {
                end += 1;
            } else {
                break;
            }
        }
        if end == start {
            return Ok(Visit::Pass);
        }

        let name = std::str::from_utf8(&bytes[start..end])
            .map_err(|e| SqlNamedError::bind(format!("invalid parameter name: {e}")))?;
        names.push(name.to_string());
        out.push(b'?');
        Ok(Visit::Consumed(end))
    })?;

    Ok(CompiledQuery { sql, names })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_in_order_with_repeats() {
        let q = compile_named("SELECT * FROM t WHERE a = :a AND b = :b OR a2 = :a").unwrap();
        assert_eq!(q.sql, "SELECT * FROM t WHERE a = ? AND b = ? OR a2 = ?");
        assert_eq!(q.names, vec!["a", "b", "a"]);
    }

    #[test]
    fn leaves_casts_and_literals_alone() {
        let q = compile_named("SELECT :id::text, ':nope', \"x:y\" -- :c\nFROM t").unwrap();
        assert_eq!(q.sql, "SELECT ?::text, ':nope', \"x:y\" -- :c\nFROM t");
        assert_eq!(q.names, vec!["id"]);
    }

    #[test]
    fn dotted_names_and_trailing_dot() {
        let q = compile_named("WHERE owner = :owner.id AND x = :x.").unwrap();
        assert_eq!(q.sql, "WHERE owner = ? AND x = ?.");
        assert_eq!(q.names, vec!["owner.id", "x"]);
    }

    #[test]
    fn bare_colon_is_copied() {
        let q = compile_named("SELECT a : b, :1x FROM t").unwrap();
        assert_eq!(q.sql, "SELECT a : b, ? FROM t");
        assert_eq!(q.names, vec!["1x"]);
    }

    #[test]
    fn no_placeholders() {
        let q = compile_named("UPDATE t SET flag = 1").unwrap();
        assert_eq!(q.sql, "UPDATE t SET flag = 1");
        assert!(q.names.is_empty());
    }
}
