pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'#')
        || (bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-'))
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Index just past the newline ending a line comment started at `start` (or the end of input).
pub(super) fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| start + offset + 1)
}

/// Index just past the `*/` closing a block comment opened at `start`.
pub(super) fn skip_block_comment(bytes: &[u8], start: usize) -> Option<usize> {
    let mut idx = start + 2;
    while idx < bytes.len() {
        if is_block_comment_end(bytes, idx) {
            return Some(idx + 2);
        }
        idx += 1;
    }
    None
}

/// Case-insensitive keyword match at `idx`, requiring whitespace right before it.
pub(super) fn keyword_after_space(bytes: &[u8], idx: usize, keyword: &[u8]) -> bool {
    idx > 0
        && bytes[idx - 1].is_ascii_whitespace()
        && bytes.len() >= idx + keyword.len()
        && bytes[idx..idx + keyword.len()].eq_ignore_ascii_case(keyword)
}

pub(super) fn skip_whitespace(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

/// Index just past the closing quote of a literal opened at `start`.
///
/// Backslash escapes and doubled quotes both stay inside the literal.
pub(super) fn skip_quoted(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut idx = start + 1;
    while idx < bytes.len() {
        let b = bytes[idx];
        if b == b'\\' && quote != b'`' {
            idx += 2;
            continue;
        }
        if b == quote {
            if bytes.get(idx + 1) == Some(&quote) {
                idx += 2;
                continue;
            }
            return Some(idx + 1);
        }
        idx += 1;
    }
    None
}
