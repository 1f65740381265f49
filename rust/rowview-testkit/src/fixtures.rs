//! Small fixture tables.

use std::sync::Arc;

use rowview_source::{MatrixRowSource, RowSource, Value};

/// Column index of `_id` in every fixture table.
pub const ID_COLUMN: usize = 0;

/// Column index of the second column (`name` or `key`) in every fixture table.
pub const VALUE_COLUMN: usize = 1;

/// The `(_id, name)` table `[(0, Alpha), (1, Beta), (2, Omega), (3, Beta)]`.
pub fn names_table() -> MatrixRowSource {
    keyed_table_with_column(
        "name",
        &[Some("Alpha"), Some("Beta"), Some("Omega"), Some("Beta")],
    )
}

/// A `(_id, key)` table with one row per entry of `keys`; `_id` is the row
/// position and `None` is stored as NULL.
pub fn keyed_table(keys: &[Option<&str>]) -> MatrixRowSource {
    keyed_table_with_column("key", keys)
}

/// An `(_id, value)` table with `count` rows where `value = _id * 10`.
pub fn numbered_table(count: usize) -> MatrixRowSource {
    let mut table = MatrixRowSource::new(["_id", "value"]);
    for id in 0..count as i64 {
        table
            .add_row(vec![Value::Integer(id), Value::Integer(id * 10)])
            .expect("row width");
    }
    table
}

/// Shares `table` as a row source while keeping a typed handle for assertions
/// on its close and seek counters.
pub fn share(table: MatrixRowSource) -> (Arc<MatrixRowSource>, Arc<dyn RowSource>) {
    let typed = Arc::new(table);
    let source: Arc<dyn RowSource> = typed.clone();
    (typed, source)
}

fn keyed_table_with_column(column: &str, keys: &[Option<&str>]) -> MatrixRowSource {
    let mut table = MatrixRowSource::new(["_id", column]);
    for (id, key) in keys.iter().enumerate() {
        table
            .add_row(vec![Value::Integer(id as i64), Value::from(*key)])
            .expect("row width");
    }
    table
}
