//! The virtual cursor: a reorderable, filterable view over a row source.

use std::{
    any::Any,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use rowview_common::{Result, error::Error};
use rowview_position_map::PositionMap;
use rowview_source::{RowSource, resolve_root};

use crate::{
    options::CursorOptions,
    registry::{Release, SourceRegistry, WrapperId},
};

/// A logical sequence of rows presented through a [`PositionMap`] over a wrapped
/// row source.
///
/// Logical row `i` is the source row at `map[i]`. Rows can be dropped, repeated
/// and reordered without copying data, and a slot can be empty: an empty row is
/// navigable but every column read on it fails with `EmptyRow`.
///
/// A `VirtualCursor` is itself a [`RowSource`], so cursors can be stacked by
/// wrapping one in an `Arc` and building another on top of it. Every cursor
/// registers with its [`SourceRegistry`] under the root of its wrapper chain;
/// the root is closed when the last cursor over it is closed or dropped.
///
/// The map and the current position are guarded together, so a map mutation and
/// the position reset that goes with it are observed as one step.
pub struct VirtualCursor {
    id: WrapperId,
    source: Arc<dyn RowSource>,
    root: Arc<dyn RowSource>,
    registry: Arc<SourceRegistry>,
    options: CursorOptions,
    state: Mutex<CursorState>,
    closed: AtomicBool,
}

struct CursorState {
    map: PositionMap,
    position: i64,
}

impl CursorState {
    fn count(&self) -> u64 {
        self.map.len() as u64
    }

    /// Physical slot of the current row.
    fn current_slot(&self) -> Result<Option<u64>> {
        let index = usize::try_from(self.position)
            .ok()
            .filter(|&index| index < self.map.len())
            .ok_or_else(|| Error::position_out_of_range(self.position, self.count()))?;
        self.map.physical(index)
    }
}

impl VirtualCursor {
    /// Creates a cursor over `source` and registers it under the source's root.
    ///
    /// When `source` is, or wraps, another virtual cursor, the new cursor joins
    /// the registry of the nearest such cursor instead of `registry`, so every
    /// cursor of a chain is tracked in one place.
    pub(crate) fn new(
        source: Arc<dyn RowSource>,
        map: PositionMap,
        registry: Arc<SourceRegistry>,
        options: CursorOptions,
    ) -> VirtualCursor {
        let id = WrapperId::next();
        let root = resolve_root(&source);
        let registry = match chain_registry(&source) {
            Some(inherited) if !Arc::ptr_eq(&inherited, &registry) => {
                log::debug!("virtual cursor {id:?} joins the registry of the cursor it wraps");
                inherited
            }
            _ => registry,
        };
        registry.register(&root, id);
        VirtualCursor {
            id,
            source,
            root,
            registry,
            options,
            state: Mutex::new(CursorState { map, position: -1 }),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> WrapperId {
        self.id
    }

    /// The source this cursor directly wraps.
    pub fn wrapped_source(&self) -> &Arc<dyn RowSource> {
        &self.source
    }

    /// The innermost, non-wrapping source of the wrapper chain.
    pub fn root_source(&self) -> Arc<dyn RowSource> {
        Arc::clone(&self.root)
    }

    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// Returns `true` if the current row has no backing source row.
    ///
    /// Fails with `PositionOutOfRange` when the cursor is before the first or
    /// after the last row.
    pub fn is_empty_row(&self) -> Result<bool> {
        self.lock_state()
            .current_slot()
            .map(|slot| slot.is_none())
    }

    /// Returns a snapshot of the position map, with empty slots as `-1`.
    pub fn filter_map(&self) -> Vec<i64> {
        self.lock_state().map.to_signed()
    }

    /// Returns a copy of the position map.
    pub fn position_map(&self) -> PositionMap {
        self.lock_state().map.clone()
    }

    /// Rebuilds the map as the identity over the wrapped source's current row
    /// count and moves before the first row.
    pub fn reset_to_identity_filter(&self) {
        let map = PositionMap::identity(self.source.count());
        let mut state = self.lock_state();
        state.map = map;
        state.position = -1;
    }

    /// Returns `true` if the cursor presents exactly the rows of the wrapped
    /// source, in source order.
    pub fn is_identity_filter(&self) -> bool {
        self.lock_state().map.is_identity(self.source.count())
    }

    /// Rearranges the current rows: logical row `i` becomes the row currently at
    /// `arrangement[i]`. Moves before the first row.
    ///
    /// Indices address the current logical order, so successive calls compound.
    /// On `IndexOutOfRange` the map and position are left unchanged.
    pub fn refilter(&self, arrangement: &[usize]) -> Result<()> {
        let mut state = self.lock_state();
        state.map = state.map.rearrange(arrangement)?;
        state.position = -1;
        Ok(())
    }

    /// Swaps two logical rows. The current position is kept.
    pub fn swap_items(&self, first: usize, second: usize) -> Result<()> {
        self.lock_state().map.swap(first, second)
    }

    /// Re-executing the query behind a virtual view is not supported.
    pub fn requery(&self) -> Result<()> {
        Err(Error::unsupported("requery"))
    }

    /// Returns `true` if this cursor was closed or its root was closed by someone
    /// else.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.root.is_closed()
    }

    /// Closes this cursor and, if it was the last open one over its root, the
    /// root source. Closing twice has no further effect.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            log::trace!("virtual cursor {:?} is already closed", self.id);
            return;
        }
        if let Release::Orphaned = self.registry.release(&self.root, self.id) {
            log::debug!("virtual cursor {:?} closed the root source", self.id);
        }
    }

    /// The registry this cursor is tracked in.
    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    fn lock_state(&self) -> MutexGuard<'_, CursorState> {
        self.state.lock().expect("cursor state lock")
    }

    /// Runs `read` against the wrapped source positioned at the current row.
    fn read_row<T>(&self, read: impl FnOnce(&dyn RowSource) -> Result<T>) -> Result<T> {
        let state = self.lock_state();
        let physical = state.current_slot()?.ok_or_else(Error::empty_row)?;
        if self.options.resync_source_on_read {
            let target = i64::try_from(physical)
                .map_err(|_| Error::position_out_of_range(i64::MAX, self.source.count()))?;
            if self.source.position() != target && !self.source.move_to_position(target) {
                return Err(Error::position_out_of_range(target, self.source.count()));
            }
        }
        read(self.source.as_ref())
    }
}

impl RowSource for VirtualCursor {
    fn count(&self) -> u64 {
        self.lock_state().count()
    }

    fn position(&self) -> i64 {
        self.lock_state().position
    }

    fn move_to_position(&self, position: i64) -> bool {
        let mut state = self.lock_state();
        let count = state.count() as i64;
        if position >= count {
            state.position = count;
            return false;
        }
        if position < 0 {
            state.position = -1;
            return false;
        }

        let moved = match state.map.get(position as usize).flatten() {
            // Empty rows are navigable without touching the source.
            None => true,
            Some(physical) => i64::try_from(physical)
                .is_ok_and(|physical| self.source.move_to_position(physical)),
        };
        state.position = if moved { position } else { -1 };
        moved
    }

    fn column_count(&self) -> usize {
        self.source.column_count()
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.source.column_name(column)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.source.column_index(name)
    }

    fn column_names(&self) -> Vec<String> {
        self.source.column_names()
    }

    fn is_null(&self, column: usize) -> Result<bool> {
        self.read_row(|source| source.is_null(column))
    }

    fn get_long(&self, column: usize) -> Result<i64> {
        self.read_row(|source| source.get_long(column))
    }

    fn get_int(&self, column: usize) -> Result<i32> {
        self.read_row(|source| source.get_int(column))
    }

    fn get_short(&self, column: usize) -> Result<i16> {
        self.read_row(|source| source.get_short(column))
    }

    fn get_double(&self, column: usize) -> Result<f64> {
        self.read_row(|source| source.get_double(column))
    }

    fn get_float(&self, column: usize) -> Result<f32> {
        self.read_row(|source| source.get_float(column))
    }

    fn get_string(&self, column: usize) -> Result<Option<String>> {
        self.read_row(|source| source.get_string(column))
    }

    fn get_blob(&self, column: usize) -> Result<Option<Vec<u8>>> {
        self.read_row(|source| source.get_blob(column))
    }

    fn copy_string_to_buffer(&self, column: usize, buffer: &mut String) -> Result<()> {
        self.read_row(|source| source.copy_string_to_buffer(column, buffer))
    }

    fn close(&self) {
        VirtualCursor::close(self);
    }

    fn is_closed(&self) -> bool {
        VirtualCursor::is_closed(self)
    }

    fn as_wrapper(&self) -> Option<&Arc<dyn RowSource>> {
        Some(&self.source)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// Registry of the first virtual cursor met walking the wrapper chain down from
/// `source`.
fn chain_registry(source: &Arc<dyn RowSource>) -> Option<Arc<SourceRegistry>> {
    let mut current = Arc::clone(source);
    loop {
        if let Some(cursor) = current
            .as_any()
            .and_then(|any| any.downcast_ref::<VirtualCursor>())
        {
            return Some(Arc::clone(&cursor.registry));
        }
        let inner = Arc::clone(current.as_wrapper()?);
        current = inner;
    }
}

impl Drop for VirtualCursor {
    fn drop(&mut self) {
        if !*self.closed.get_mut() {
            self.close();
        }
    }
}

impl std::fmt::Debug for VirtualCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("VirtualCursor")
            .field("id", &self.id)
            .field("position", &state.position)
            .field("map", &state.map)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}
