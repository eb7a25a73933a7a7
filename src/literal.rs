//! MySQL literal escaping.
//!
//! [`escape_literal`] is what [`Driver::escape_literal`](crate::driver::Driver::escape_literal)
//! falls back to when a driver does not supply its own escaping. It follows the rules of
//! `mysql_real_escape_string` for the default (backslash-escapes enabled) SQL mode.

use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};

use crate::error::SqlReactorError;
use crate::types::RowValues;

/// Render a value as a SQL literal ready to be spliced into statement text.
///
/// # Errors
/// Returns `SqlReactorError::ParameterError` for non-finite floats, which MySQL cannot store.
pub fn escape_literal(value: &RowValues) -> Result<String, SqlReactorError> {
    match value {
        RowValues::Null => Ok("NULL".to_string()),
        RowValues::Int(i) => Ok(i.to_string()),
        RowValues::Float(f) => {
            if f.is_finite() {
                Ok(f.to_string())
            } else {
                Err(SqlReactorError::ParameterError(format!(
                    "cannot bind non-finite float {f}"
                )))
            }
        }
        RowValues::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        RowValues::Text(s) => Ok(quote_string(s)),
        RowValues::Timestamp(dt) => Ok(format!("'{}'", format_timestamp(dt))),
        RowValues::JSON(json) => {
            let text = serde_json::to_string(json).map_err(|err| {
                SqlReactorError::ParameterError(format!("cannot encode JSON parameter: {err}"))
            })?;
            Ok(quote_string(&text))
        }
        RowValues::Blob(bytes) => {
            let mut out = String::with_capacity(bytes.len() * 2 + 3);
            out.push_str("X'");
            for b in bytes {
                let _ = write!(out, "{b:02X}");
            }
            out.push('\'');
            Ok(out)
        }
    }
}

/// Escape a string and wrap it in single quotes.
#[must_use]
pub fn quote_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for c in raw.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn format_timestamp(dt: &NaiveDateTime) -> String {
    let micros = dt.nanosecond() / 1_000;
    if micros == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        format!("{}.{micros:06}", dt.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn quotes_and_escapes_text() {
        let lit = escape_literal(&RowValues::Text("O'Reilly \"x\"\n\\".into())).unwrap();
        assert_eq!(lit, r#"'O\'Reilly \"x\"\n\\'"#);
    }

    #[test]
    fn escapes_control_bytes() {
        assert_eq!(quote_string("a\0b\r\x1a"), r"'a\0b\r\Z'");
    }

    #[test]
    fn scalars() {
        assert_eq!(escape_literal(&RowValues::Null).unwrap(), "NULL");
        assert_eq!(escape_literal(&RowValues::Int(-42)).unwrap(), "-42");
        assert_eq!(escape_literal(&RowValues::Bool(true)).unwrap(), "1");
        assert_eq!(escape_literal(&RowValues::Float(1.5)).unwrap(), "1.5");
        assert_eq!(
            escape_literal(&RowValues::Blob(vec![0x00, 0xAB])).unwrap(),
            "X'00AB'"
        );
    }

    #[test]
    fn rejects_nan() {
        assert!(matches!(
            escape_literal(&RowValues::Float(f64::NAN)),
            Err(SqlReactorError::ParameterError(_))
        ));
    }

    #[test]
    fn timestamps_with_and_without_fraction() {
        let base = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let whole = base.and_hms_opt(8, 5, 1).unwrap();
        let frac = base.and_hms_micro_opt(8, 5, 1, 250).unwrap();
        assert_eq!(
            escape_literal(&RowValues::Timestamp(whole)).unwrap(),
            "'2024-03-09 08:05:01'"
        );
        assert_eq!(
            escape_literal(&RowValues::Timestamp(frac)).unwrap(),
            "'2024-03-09 08:05:01.000250'"
        );
    }

    #[test]
    fn json_is_quoted_text() {
        let lit = escape_literal(&RowValues::JSON(serde_json::json!({"k": "v'"}))).unwrap();
        assert_eq!(lit, r#"'{\"k\":\"v\'\"}'"#);
    }
}
