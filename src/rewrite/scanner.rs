use super::parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, keyword_after_space,
    skip_block_comment, skip_line_comment, skip_quoted, skip_whitespace,
};

/// Byte span of the parenthesised group following `VALUES`, parentheses included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValuesClause {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Copy)]
enum State {
    Normal,
    LineComment,
    BlockComment,
}

/// Locate the first `VALUES (...)` group that sits outside quotes and comments.
#[must_use]
pub fn find_values_clause(sql: &str) -> Option<ValuesClause> {
    let bytes = sql.as_bytes();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' | b'"' | b'`' => {
                    idx = skip_quoted(bytes, idx)?;
                    continue;
                }
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1;
                }
                b'v' | b'V' if keyword_after_space(bytes, idx, b"values") => {
                    let open = skip_whitespace(bytes, idx + "values".len());
                    if bytes.get(open) == Some(&b'(')
                        && let Some(close) = match_group(bytes, open)
                    {
                        return Some(ValuesClause {
                            start: open,
                            end: close,
                        });
                    }
                }
                _ => {}
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    None
}

/// Walk from the `(` at `open` to the index just past its matching `)`.
fn match_group(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut idx = open;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\'' | b'"' | b'`' => {
                idx = skip_quoted(bytes, idx)?;
                continue;
            }
            _ if is_line_comment_start(bytes, idx) => {
                idx = skip_line_comment(bytes, idx);
                continue;
            }
            _ if is_block_comment_start(bytes, idx) => {
                idx = skip_block_comment(bytes, idx)?;
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
        idx += 1;
    }
    None
}
