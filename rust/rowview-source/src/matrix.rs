//! In-memory row source over a matrix of dynamically typed cells.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use ahash::AHashMap;
use rowview_common::{Result, error::Error, verify_arg};

use crate::{RowSource, Value};

/// A row source backed by rows of [`Value`]s held in memory.
///
/// Rows are appended while the source is exclusively owned; once shared behind an
/// `Arc` the data is immutable and only the cursor position and the closed state
/// change. Numeric reads coerce between integer, real and numeric text; NULL
/// reads as zero.
///
/// The source counts its `close()` calls and positional seeks, which is useful
/// for checking that wrappers close it exactly once and skip seeks for empty rows.
pub struct MatrixRowSource {
    columns: Vec<String>,
    column_lookup: AHashMap<String, usize>,
    rows: Vec<Vec<Value>>,
    position: AtomicI64,
    closed: AtomicBool,
    close_calls: AtomicUsize,
    seeks: AtomicUsize,
}

impl MatrixRowSource {
    /// Creates an empty source with the given column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> MatrixRowSource {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut column_lookup = AHashMap::with_capacity(columns.len());
        for (index, name) in columns.iter().enumerate() {
            column_lookup.entry(name.clone()).or_insert(index);
        }
        MatrixRowSource {
            columns,
            column_lookup,
            rows: Vec::new(),
            position: AtomicI64::new(-1),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
            seeks: AtomicUsize::new(0),
        }
    }

    /// Appends a row. The row must have exactly one value per column.
    pub fn add_row(&mut self, row: Vec<Value>) -> Result<()> {
        verify_arg!(row, row.len() == self.columns.len());
        self.rows.push(row);
        Ok(())
    }

    /// Appends several rows, stopping at the first malformed one.
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Vec<Value>>) -> Result<()> {
        for row in rows {
            self.add_row(row)?;
        }
        Ok(())
    }

    /// Number of times `close()` has been called, including redundant calls.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::Acquire)
    }

    /// Number of successful in-range seeks performed so far.
    pub fn seeks(&self) -> usize {
        self.seeks.load(Ordering::Acquire)
    }

    /// Returns the cell at the current position.
    pub fn value(&self, column: usize) -> Result<&Value> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::closed("read from a closed matrix source"));
        }
        let position = self.position.load(Ordering::Acquire);
        let row = usize::try_from(position)
            .ok()
            .and_then(|index| self.rows.get(index))
            .ok_or_else(|| Error::position_out_of_range(position, self.rows.len() as u64))?;
        row.get(column).ok_or_else(|| {
            Error::invalid_arg(
                "column",
                format!("index {column} exceeds column count {}", self.columns.len()),
            )
        })
    }
}

impl RowSource for MatrixRowSource {
    fn count(&self) -> u64 {
        self.rows.len() as u64
    }

    fn position(&self) -> i64 {
        self.position.load(Ordering::Acquire)
    }

    fn move_to_position(&self, position: i64) -> bool {
        let count = self.rows.len() as i64;
        if position >= count {
            self.position.store(count, Ordering::Release);
            return false;
        }
        if position < 0 {
            self.position.store(-1, Ordering::Release);
            return false;
        }
        self.seeks.fetch_add(1, Ordering::AcqRel);
        self.position.store(position, Ordering::Release);
        true
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.columns.get(column).cloned()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.column_lookup.get(name).copied()
    }

    fn is_null(&self, column: usize) -> Result<bool> {
        self.value(column).map(Value::is_null)
    }

    fn get_long(&self, column: usize) -> Result<i64> {
        match self.value(column)? {
            Value::Null => Ok(0),
            Value::Integer(v) => Ok(*v),
            Value::Real(v) => Ok(*v as i64),
            Value::Text(v) => v
                .trim()
                .parse::<i64>()
                .or_else(|_| v.trim().parse::<f64>().map(|f| f as i64))
                .map_err(|_| Error::type_mismatch(column, "integer")),
            Value::Blob(_) => Err(Error::type_mismatch(column, "integer")),
        }
    }

    fn get_double(&self, column: usize) -> Result<f64> {
        match self.value(column)? {
            Value::Null => Ok(0.0),
            Value::Integer(v) => Ok(*v as f64),
            Value::Real(v) => Ok(*v),
            Value::Text(v) => v
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::type_mismatch(column, "real")),
            Value::Blob(_) => Err(Error::type_mismatch(column, "real")),
        }
    }

    fn get_string(&self, column: usize) -> Result<Option<String>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Blob(_) => Err(Error::type_mismatch(column, "text")),
            other => Ok(Some(other.to_string())),
        }
    }

    fn get_blob(&self, column: usize) -> Result<Option<Vec<u8>>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Blob(v) => Ok(Some(v.clone())),
            Value::Text(v) => Ok(Some(v.as_bytes().to_vec())),
            _ => Err(Error::type_mismatch(column, "blob")),
        }
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::AcqRel);
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use rowview_common::error::ErrorKind;

    use super::*;

    fn sample() -> MatrixRowSource {
        let mut source = MatrixRowSource::new(["_id", "name", "score"]);
        source
            .extend_rows([
                vec![Value::Integer(0), "Alpha".into(), Value::Real(1.5)],
                vec![Value::Integer(1), Value::Null, "42".into()],
            ])
            .unwrap();
        source
    }

    #[test]
    fn navigation_clamps_like_a_cursor() {
        let source = sample();
        assert_eq!(source.position(), -1);
        assert!(source.is_before_first());
        assert!(source.move_to_first());
        assert!(source.is_first());
        assert!(source.move_to_next());
        assert!(source.is_last());
        assert!(!source.move_to_next());
        assert_eq!(source.position(), 2);
        assert!(source.is_after_last());
        assert!(!source.move_to_position(-5));
        assert_eq!(source.position(), -1);
        assert_eq!(source.seeks(), 2);
    }

    #[test]
    fn typed_reads_coerce() {
        let source = sample();
        assert!(source.move_to_position(0));
        assert_eq!(source.get_long(0).unwrap(), 0);
        assert_eq!(source.get_string(1).unwrap().as_deref(), Some("Alpha"));
        assert_eq!(source.get_int(2).unwrap(), 1);
        assert_eq!(source.get_float(2).unwrap(), 1.5);

        assert!(source.move_to_position(1));
        assert!(source.is_null(1).unwrap());
        assert_eq!(source.get_string(1).unwrap(), None);
        assert_eq!(source.get_short(2).unwrap(), 42);

        let mut buffer = String::from("stale");
        source.copy_string_to_buffer(1, &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn reads_fail_outside_rows_and_after_close() {
        let source = sample();
        let err = source.get_long(0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PositionOutOfRange { .. }));

        assert!(source.move_to_first());
        source.close();
        source.close();
        assert!(source.is_closed());
        assert_eq!(source.close_calls(), 2);
        assert!(matches!(
            source.get_long(0).unwrap_err().kind(),
            ErrorKind::Closed { .. }
        ));
    }

    #[test]
    fn column_lookup_and_row_width() {
        let mut source = sample();
        assert_eq!(source.column_index("score"), Some(2));
        assert_eq!(source.column_index("missing"), None);
        assert_eq!(source.column_names(), vec!["_id", "name", "score"]);
        assert!(source.add_row(vec![Value::Null]).is_err());
    }
}
