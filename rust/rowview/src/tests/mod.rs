use std::sync::Arc;

use crate::{CursorFactory, SourceRegistry};

mod cursor_tests;

/// A factory over a private registry, so tests do not observe each other.
fn isolated_factory() -> CursorFactory {
    CursorFactory::with_registry(Arc::new(SourceRegistry::new()))
}

/// Reads `column` as text for every logical row, front to back.
fn read_strings(cursor: &dyn rowview_source::RowSource, column: usize) -> Vec<Option<String>> {
    let mut values = Vec::new();
    let mut more = cursor.move_to_first();
    while more {
        values.push(cursor.get_string(column).expect("readable row"));
        more = cursor.move_to_next();
    }
    values
}
