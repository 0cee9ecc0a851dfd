use crate::error::SqlNamedError;

/// Lexical position of the walker. Only `Normal` positions are offered to visitors.
#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// What a visitor did with the byte it was offered.
pub(crate) enum Visit {
    /// Not interesting; the walker copies the byte through.
    Pass,
    /// The visitor wrote its own output and consumed input up to this index (exclusive).
    Consumed(usize),
}

/// Walk `sql`, copying literals, quoted identifiers and comments through unchanged and
/// offering every other byte position to `visit`.
///
/// Visitors only ever split the input at ASCII bytes, so the output stays valid UTF-8.
pub(crate) fn rewrite_code<F>(sql: &str, mut visit: F) -> Result<String, SqlNamedError>
where
    F: FnMut(&[u8], usize, &mut Vec<u8>) -> Result<Visit, SqlNamedError>,
{
    let bytes = sql.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() + 16);
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        if matches!(state, State::Normal)
            && b == b'$'
            && let Some((tag, close)) = try_start_dollar_quote(bytes, idx)
        {
            out.extend_from_slice(&bytes[idx..=close]);
            state = State::DollarQuoted(tag);
            idx = close + 1;
            continue;
        }

        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    out.extend_from_slice(b"/*");
                    idx += 2;
                    continue;
                }
                _ => {
                    if let Visit::Consumed(next) = visit(bytes, idx, &mut out)? {
                        idx = next;
                        continue;
                    }
                }
            },
            State::SingleQuoted => state = close_quote(bytes, &mut idx, &mut out, b'\''),
            State::DoubleQuoted => state = close_quote(bytes, &mut idx, &mut out, b'"'),
            State::Backticked => state = close_quote(bytes, &mut idx, &mut out, b'`'),
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    out.extend_from_slice(b"/*");
                    idx += 2;
                    continue;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    out.extend_from_slice(b"*/");
                    idx += 2;
                    continue;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    let end = idx + tag.len() + 1;
                    out.extend_from_slice(&bytes[idx..=end]);
                    state = State::Normal;
                    idx = end + 1;
                    continue;
                }
            }
        }

        out.push(b);
        idx += 1;
    }

    String::from_utf8(out)
        .map_err(|e| SqlNamedError::bind(format!("rewritten query is not valid UTF-8: {e}")))
}

/// Inside a quoted run: a doubled quote is an escape, a single one closes the run.
fn close_quote(bytes: &[u8], idx: &mut usize, out: &mut Vec<u8>, quote: u8) -> State {
    let still_open = match quote {
        b'\'' => State::SingleQuoted,
        b'"' => State::DoubleQuoted,
        _ => State::Backticked,
    };
    if bytes[*idx] != quote {
        return still_open;
    }
    if bytes.get(*idx + 1) == Some(&quote) {
        out.push(quote);
        *idx += 1;
        return still_open;
    }
    State::Normal
}

pub(crate) fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// `$tag$` opener starting at `start`; returns the tag and the index of the closing `$`.
/// A `$` followed by digits is a positional placeholder, not a quote.
fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        if !is_name_byte(bytes[idx]) {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    end < bytes.len() && &bytes[idx + 1..end] == tag.as_bytes() && bytes[end] == b'$'
}
