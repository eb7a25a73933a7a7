//! Statement rewriting: `%s` placeholder substitution and multi-row `VALUES` expansion.
//!
//! Every argument passes through the supplied escaping function before it is spliced into
//! statement text; nothing here ever copies a raw argument into the output.

mod parsers;
mod scanner;

pub use scanner::{ValuesClause, find_values_clause};

use crate::config::ValuesClauseMiss;
use crate::error::SqlReactorError;
use crate::types::RowValues;

/// Substitute pre-escaped literals into `%s` markers.
///
/// `%%` produces a single `%`. Any other `%` sequence, or a marker/literal count
/// mismatch, is rejected.
///
/// # Errors
/// Returns `SqlReactorError::ParameterError` when the template and literals disagree.
pub fn format_placeholders(template: &str, literals: &[String]) -> Result<String, SqlReactorError> {
    let mut out = String::with_capacity(template.len() + literals.iter().map(String::len).sum::<usize>());
    let mut literals = literals.iter();
    let mut chars = template.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, 's')) => {
                let literal = literals.next().ok_or_else(|| {
                    SqlReactorError::ParameterError(
                        "not enough arguments for statement placeholders".to_string(),
                    )
                })?;
                out.push_str(literal);
            }
            Some((_, '%')) => out.push('%'),
            Some((_, other)) => {
                return Err(SqlReactorError::ParameterError(format!(
                    "unsupported placeholder '%{other}' at byte {pos}"
                )));
            }
            None => {
                return Err(SqlReactorError::ParameterError(
                    "statement ends with an incomplete placeholder".to_string(),
                ));
            }
        }
    }

    let unused = literals.count();
    if unused > 0 {
        return Err(SqlReactorError::ParameterError(format!(
            "{unused} argument(s) not converted by statement placeholders"
        )));
    }
    Ok(out)
}

fn escape_all<F>(args: &[RowValues], escape: &F) -> Result<Vec<String>, SqlReactorError>
where
    F: Fn(&RowValues) -> Result<String, SqlReactorError>,
{
    args.iter().map(escape).collect()
}

/// Escape one argument tuple and substitute it into `template`.
///
/// # Errors
/// Propagates escaping failures and placeholder mismatches.
pub fn render_statement<F>(
    template: &str,
    args: &[RowValues],
    escape: F,
) -> Result<String, SqlReactorError>
where
    F: Fn(&RowValues) -> Result<String, SqlReactorError>,
{
    let literals = escape_all(args, &escape)?;
    format_placeholders(template, &literals)
}

/// Expand the `VALUES (...)` group of `template` once per argument tuple.
///
/// Each tuple instantiates the group with its own escaped literals; the instances are
/// joined with `", "` and spliced in place of the original group. Text before and after
/// the group is kept verbatim. When no group is found, `miss` decides between sending
/// `template` unmodified and rejecting the call.
///
/// # Errors
/// Returns `SqlReactorError::ParameterError` for an empty argument sequence, a rejected
/// miss, or any escaping / placeholder failure.
pub fn render_batch<F>(
    template: &str,
    arg_sets: &[Vec<RowValues>],
    miss: ValuesClauseMiss,
    escape: F,
) -> Result<String, SqlReactorError>
where
    F: Fn(&RowValues) -> Result<String, SqlReactorError>,
{
    if arg_sets.is_empty() {
        return Err(SqlReactorError::ParameterError(
            "batched statement needs at least one argument tuple".to_string(),
        ));
    }

    let Some(clause) = find_values_clause(template) else {
        return match miss {
            ValuesClauseMiss::SendUnmodified => {
                tracing::warn!(
                    tuples = arg_sets.len(),
                    "no VALUES clause found; sending batched statement unmodified"
                );
                Ok(template.to_string())
            }
            ValuesClauseMiss::Reject => Err(SqlReactorError::ParameterError(
                "batched statement has no VALUES (...) clause".to_string(),
            )),
        };
    };

    let group = &template[clause.start..clause.end];
    let mut expanded = Vec::with_capacity(arg_sets.len());
    for args in arg_sets {
        let literals = escape_all(args, &escape)?;
        expanded.push(format_placeholders(group, &literals)?);
    }

    let joined = expanded.join(", ");
    let mut out =
        String::with_capacity(clause.start + joined.len() + template.len() - clause.end);
    out.push_str(&template[..clause.start]);
    out.push_str(&joined);
    out.push_str(&template[clause.end..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::escape_literal;

    fn lits(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn substitutes_in_order() {
        let sql = format_placeholders("SELECT %s, %s", &lits(&["1", "'a'"])).unwrap();
        assert_eq!(sql, "SELECT 1, 'a'");
    }

    #[test]
    fn double_percent_is_literal() {
        let sql = format_placeholders("SELECT * FROM t WHERE a LIKE 'x%%' AND b = %s", &lits(&["2"]))
            .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a LIKE 'x%' AND b = 2");
    }

    #[test]
    fn substitution_is_textual_inside_quotes() {
        let sql = format_placeholders("SELECT '%s'", &lits(&["1"])).unwrap();
        assert_eq!(sql, "SELECT '1'");
    }

    #[test]
    fn count_mismatch_is_rejected() {
        assert!(format_placeholders("SELECT %s, %s", &lits(&["1"])).is_err());
        assert!(format_placeholders("SELECT %s", &lits(&["1", "2"])).is_err());
        assert!(format_placeholders("SELECT 100%", &[]).is_err());
        assert!(format_placeholders("SELECT %d", &lits(&["1"])).is_err());
    }

    #[test]
    fn no_args_no_markers_is_unchanged() {
        assert_eq!(format_placeholders("SELECT 1 AS x", &[]).unwrap(), "SELECT 1 AS x");
    }

    #[test]
    fn render_statement_escapes_every_argument() {
        let sql = render_statement(
            "SELECT * FROM users WHERE name = %s",
            &[RowValues::Text("x' OR '1'='1".into())],
            escape_literal,
        )
        .unwrap();
        assert_eq!(sql, r"SELECT * FROM users WHERE name = 'x\' OR \'1\'=\'1'");
    }

    #[test]
    fn batch_expands_each_tuple() {
        let sets = vec![
            vec![RowValues::Int(1), RowValues::Text("a".into())],
            vec![RowValues::Int(2), RowValues::Text("b'c".into())],
            vec![RowValues::Int(3), RowValues::Null],
        ];
        let sql = render_batch(
            "INSERT INTO t (a,b) VALUES (%s,%s)",
            &sets,
            ValuesClauseMiss::SendUnmodified,
            escape_literal,
        )
        .unwrap();
        assert_eq!(
            sql,
            r"INSERT INTO t (a,b) VALUES (1,'a'), (2,'b\'c'), (3,NULL)"
        );
    }

    #[test]
    fn batch_keeps_trailing_clause() {
        let sets = vec![vec![RowValues::Int(1)], vec![RowValues::Int(2)]];
        let sql = render_batch(
            "INSERT INTO t (a) VALUES (%s) ON DUPLICATE KEY UPDATE a = a + 1",
            &sets,
            ValuesClauseMiss::SendUnmodified,
            escape_literal,
        )
        .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO t (a) VALUES (1), (2) ON DUPLICATE KEY UPDATE a = a + 1"
        );
    }

    #[test]
    fn batch_nested_group_template() {
        let sets = vec![
            vec![RowValues::Text("A".into()), RowValues::Int(1)],
            vec![RowValues::Text("B".into()), RowValues::Int(2)],
        ];
        let sql = render_batch(
            "INSERT INTO t (a, b) VALUES (LOWER(%s), %s)",
            &sets,
            ValuesClauseMiss::SendUnmodified,
            escape_literal,
        )
        .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO t (a, b) VALUES (LOWER('A'), 1), (LOWER('B'), 2)"
        );
    }

    #[test]
    fn batch_miss_follows_policy() {
        let sets = vec![vec![RowValues::Int(1)]];
        let sent = render_batch(
            "UPDATE t SET a = %s",
            &sets,
            ValuesClauseMiss::SendUnmodified,
            escape_literal,
        )
        .unwrap();
        assert_eq!(sent, "UPDATE t SET a = %s");

        let rejected = render_batch(
            "UPDATE t SET a = %s",
            &sets,
            ValuesClauseMiss::Reject,
            escape_literal,
        );
        assert!(matches!(rejected, Err(SqlReactorError::ParameterError(_))));
    }

    #[test]
    fn batch_requires_tuples() {
        let result = render_batch(
            "INSERT INTO t VALUES (%s)",
            &[],
            ValuesClauseMiss::SendUnmodified,
            escape_literal,
        );
        assert!(matches!(result, Err(SqlReactorError::ParameterError(_))));
    }
}
