use std::sync::Arc;

use super::result_set::ResultSet;
use crate::driver::ResultCursor;
use crate::error::SqlReactorError;

/// Drain a result cursor into an ordered [`ResultSet`].
///
/// Column names are read once; rows are fetched until the cursor reports
/// exhaustion. The cursor cannot be restarted afterwards.
///
/// # Errors
/// Returns any [`SqlReactorError`] raised by the cursor while fetching, or
/// `DriverError` if a row's width disagrees with the column metadata.
pub fn materialize_rows(cursor: &mut dyn ResultCursor) -> Result<ResultSet, SqlReactorError> {
    let column_names = Arc::new(cursor.describe());
    let width = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(column_names);

    while let Some(row_values) = cursor.fetch_row()? {
        if row_values.len() != width {
            return Err(SqlReactorError::DriverError(format!(
                "row has {} values but result describes {width} columns",
                row_values.len()
            )));
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
