mod materialize;
mod result_set;
mod row;

pub use materialize::materialize_rows;
pub use result_set::ResultSet;
pub use row::ResultRow;
