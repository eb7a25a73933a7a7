//! Helper utilities for testing and development.

use std::sync::Arc;

use crate::results::ResultRow;
use crate::types::RowValues;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: &[&str], values: Vec<RowValues>) -> ResultRow {
    ResultRow::new(
        Arc::new(column_names.iter().map(|c| (*c).to_string()).collect()),
        values,
    )
}
