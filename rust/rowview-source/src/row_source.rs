use std::{any::Any, sync::Arc};

use rowview_common::Result;

/// A sequential, randomly-seekable cursor over a finite set of rows.
///
/// Positions are signed: `-1` is "before first" and `count()` is "after last".
/// All methods take `&self`; implementations keep their cursor state behind
/// interior mutability so a single source can be shared by several views through
/// an `Arc<dyn RowSource>`. Callers are expected to serialize navigation and reads
/// on a given source.
///
/// # Navigation
///
/// Only [`move_to_position`](Self::move_to_position) is required; every other
/// navigation primitive and positional predicate is derived from it and from
/// [`position`](Self::position) / [`count`](Self::count).
///
/// # Wrappers
///
/// Sources that present a view over another source report the wrapped source
/// through [`as_wrapper`](Self::as_wrapper). Following that chain to its end
/// yields the root source (see [`resolve_root`]).
pub trait RowSource: Send + Sync {
    /// Returns the number of rows.
    fn count(&self) -> u64;

    /// Returns the current position, in `[-1, count]`.
    fn position(&self) -> i64;

    /// Moves to `position`. Returns `false` if the position is outside
    /// `[0, count)` or the row cannot be reached.
    fn move_to_position(&self, position: i64) -> bool;

    fn column_count(&self) -> usize;

    /// Returns the name of the column at `column`.
    fn column_name(&self, column: usize) -> Option<String>;

    /// Returns the index of the column called `name`.
    fn column_index(&self, name: &str) -> Option<usize> {
        (0..self.column_count()).find(|&i| self.column_name(i).as_deref() == Some(name))
    }

    fn column_names(&self) -> Vec<String> {
        (0..self.column_count())
            .filter_map(|i| self.column_name(i))
            .collect()
    }

    fn is_null(&self, column: usize) -> Result<bool>;

    fn get_long(&self, column: usize) -> Result<i64>;

    fn get_int(&self, column: usize) -> Result<i32> {
        self.get_long(column).map(|value| value as i32)
    }

    fn get_short(&self, column: usize) -> Result<i16> {
        self.get_long(column).map(|value| value as i16)
    }

    fn get_double(&self, column: usize) -> Result<f64>;

    fn get_float(&self, column: usize) -> Result<f32> {
        self.get_double(column).map(|value| value as f32)
    }

    /// Returns the column value as text, `None` for NULL.
    fn get_string(&self, column: usize) -> Result<Option<String>>;

    /// Returns the column value as raw bytes, `None` for NULL.
    fn get_blob(&self, column: usize) -> Result<Option<Vec<u8>>>;

    /// Replaces the contents of `buffer` with the column's text value.
    ///
    /// NULL leaves the buffer empty.
    fn copy_string_to_buffer(&self, column: usize, buffer: &mut String) -> Result<()> {
        buffer.clear();
        if let Some(value) = self.get_string(column)? {
            buffer.push_str(&value);
        }
        Ok(())
    }

    /// Releases the source. Calling `close` on a closed source has no effect.
    fn close(&self);

    fn is_closed(&self) -> bool;

    /// Returns the source this one wraps, if it is a wrapper.
    fn as_wrapper(&self) -> Option<&Arc<dyn RowSource>> {
        None
    }

    /// Exposes the concrete source for downcasting. Wrappers that carry
    /// bookkeeping other views must share return `Some(self)`.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Moves by `offset` rows relative to the current position.
    fn move_by(&self, offset: i64) -> bool {
        self.move_to_position(self.position().saturating_add(offset))
    }

    fn move_to_first(&self) -> bool {
        self.move_to_position(0)
    }

    fn move_to_last(&self) -> bool {
        self.move_to_position(self.count() as i64 - 1)
    }

    fn move_to_next(&self) -> bool {
        self.move_to_position(self.position() + 1)
    }

    fn move_to_previous(&self) -> bool {
        self.move_to_position(self.position() - 1)
    }

    fn is_first(&self) -> bool {
        self.position() == 0 && self.count() != 0
    }

    fn is_last(&self) -> bool {
        let count = self.count();
        count != 0 && self.position() == count as i64 - 1
    }

    fn is_before_first(&self) -> bool {
        self.count() == 0 || self.position() == -1
    }

    fn is_after_last(&self) -> bool {
        let count = self.count();
        count == 0 || self.position() == count as i64
    }
}

/// Follows the wrapper chain starting at `source` down to its innermost,
/// non-wrapping source.
pub fn resolve_root(source: &Arc<dyn RowSource>) -> Arc<dyn RowSource> {
    let mut current = Arc::clone(source);
    loop {
        let inner = match current.as_wrapper() {
            Some(inner) => Arc::clone(inner),
            None => return current,
        };
        current = inner;
    }
}

/// Identity of a shared row source instance.
///
/// Two `SourceId`s compare equal iff they were taken from `Arc`s pointing at the
/// same allocation. The id does not keep the source alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(usize);

impl SourceId {
    pub fn of(source: &Arc<dyn RowSource>) -> SourceId {
        SourceId(Arc::as_ptr(source) as *const () as usize)
    }
}
