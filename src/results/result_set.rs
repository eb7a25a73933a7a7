use std::collections::HashMap;
use std::sync::Arc;

use super::row::{ResultRow, build_index};
use crate::types::RowValues;

/// Rows drained from one cursor, all pointing at the same column list and name index.
///
/// ```rust
/// use std::sync::Arc;
/// use sql_reactor::prelude::*;
///
/// let mut rs = ResultSet::with_capacity(2);
/// rs.set_column_names(Arc::new(vec!["id".to_string()]));
/// rs.add_row_values(vec![RowValues::Int(1)]);
/// rs.add_row_values(vec![RowValues::Int(2)]);
/// assert_eq!(rs.len(), 2);
///
/// let rows = rs.into_rows();
/// assert_eq!(rows[1].get("id"), Some(&RowValues::Int(2)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub results: Vec<ResultRow>,
    column_names: Option<Arc<Vec<String>>>,
    column_index_cache: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create an empty result set with room for `capacity` rows.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Expected number of rows
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
            column_index_cache: None,
        }
    }

    /// Install the column list every later row will share.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index_cache = Some(Arc::new(build_index(&column_names)));
        self.column_names = Some(column_names);
    }

    /// Column names shared by every row, once set.
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Append one row. Ignored until [`ResultSet::set_column_names`] has been called.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let (Some(column_names), Some(cache)) = (&self.column_names, &self.column_index_cache)
        {
            self.results.push(ResultRow::with_cache(
                Arc::clone(column_names),
                Arc::clone(cache),
                row_values,
            ));
        }
    }

    /// Number of rows collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when the result produced no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consume the set, keeping the rows in result order.
    ///
    /// # Returns
    ///
    /// The rows; each still carries the shared column list and name index.
    #[must_use]
    pub fn into_rows(self) -> Vec<ResultRow> {
        self.results
    }
}
