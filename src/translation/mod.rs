use std::borrow::Cow;

use clap::ValueEnum;

use crate::error::SqlNamedError;

pub(crate) mod scanner;

use scanner::{Visit, rewrite_code};

/// Native positional placeholder syntax of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PlaceholderStyle {
    /// Bare `?` (MySQL, and the intermediate form produced while binding).
    Question,
    /// PostgreSQL-style placeholders like `$1`.
    Dollar,
    /// SQLite-style placeholders like `?1`.
    NumberedQuestion,
    /// SQL Server-style placeholders like `@p1`.
    AtP,
    /// Oracle-style placeholders like `:arg1`.
    Colon,
}

impl PlaceholderStyle {
    fn write_placeholder(self, out: &mut Vec<u8>, n: usize) {
        match self {
            PlaceholderStyle::Question => out.push(b'?'),
            PlaceholderStyle::Dollar => out.extend_from_slice(format!("${n}").as_bytes()),
            PlaceholderStyle::NumberedQuestion => out.extend_from_slice(format!("?{n}").as_bytes()),
            PlaceholderStyle::AtP => out.extend_from_slice(format!("@p{n}").as_bytes()),
            PlaceholderStyle::Colon => out.extend_from_slice(format!(":arg{n}").as_bytes()),
        }
    }
}

/// Rewrite bare `?` placeholders into `target`'s numbered syntax.
///
/// Placeholders inside quoted strings, comments and dollar-quoted blocks are left alone.
/// Returns a borrowed `Cow` when the target already uses bare `?`.
///
/// # Errors
///
/// Returns `SqlNamedError::BindError` if the rewritten text is not valid UTF-8.
///
/// ```rust
/// use sql_named_ext::prelude::*;
///
/// let sql = rebind("UPDATE t SET a = ? WHERE id = ?", PlaceholderStyle::Dollar).unwrap();
/// assert_eq!(sql, "UPDATE t SET a = $1 WHERE id = $2");
/// ```
pub fn rebind(sql: &str, target: PlaceholderStyle) -> Result<Cow<'_, str>, SqlNamedError> {
    if target == PlaceholderStyle::Question || !sql.contains('?') {
        return Ok(Cow::Borrowed(sql));
    }

    let mut n = 0;
    let rebound = rewrite_code(sql, |bytes, idx, out| {
        if bytes[idx] != b'?' {
            return Ok(Visit::Pass);
        }
        n += 1;
        target.write_placeholder(out, n);
        Ok(Visit::Consumed(idx + 1))
    })?;
    Ok(Cow::Owned(rebound))
}
