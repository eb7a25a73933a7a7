use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::RowValues;

/// One materialized row: values in the column order the cursor described.
///
/// Serializes as a map from column name to value, keeping that order.
#[derive(Debug, Clone)]
pub struct ResultRow {
    /// Shared by every row of the same result.
    pub column_names: Arc<Vec<String>>,
    pub values: Vec<RowValues>,
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl ResultRow {
    /// Build a standalone row; the name index is computed here.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let cache = Arc::new(build_index(&column_names));
        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        column_index_cache: Arc<HashMap<String, usize>>,
        values: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index_cache,
        }
    }

    /// Position of `column_name`. A repeated name resolves to its first occurrence.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Value of the named column.
    ///
    /// # Returns
    ///
    /// The value, or `None` if the result has no such column
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        let idx = self.get_column_index(column_name)?;
        self.values.get(idx)
    }

    /// Value at column position `index`.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a row without columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub(crate) fn build_index(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        index.entry(name.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ResultRow {
        ResultRow::new(
            Arc::new(vec!["id".into(), "name".into(), "id".into()]),
            vec![
                RowValues::Int(7),
                RowValues::Text("bob".into()),
                RowValues::Int(8),
            ],
        )
    }

    #[test]
    fn lookup_by_name_and_position() {
        let row = row();
        assert_eq!(row.get("name"), Some(&RowValues::Text("bob".into())));
        assert_eq!(row.get_by_index(0), Some(&RowValues::Int(7)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_by_index(3), None);
    }

    #[test]
    fn duplicate_column_resolves_to_first() {
        assert_eq!(row().get("id"), Some(&RowValues::Int(7)));
    }

    #[test]
    fn serializes_in_column_order() {
        let row = ResultRow::new(
            Arc::new(vec!["z".into(), "a".into()]),
            vec![RowValues::Int(1), RowValues::Null],
        );
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"z":1,"a":null}"#);
    }
}
