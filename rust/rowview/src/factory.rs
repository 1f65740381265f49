//! Construction entry points for virtual cursors.

use std::sync::Arc;

use rowview_common::Result;
use rowview_position_map::PositionMap;
use rowview_source::{Column, RowSource};

use crate::{
    CursorGroups, VirtualCursor,
    builders::{self, JoinType},
    options::CursorOptions,
    registry::SourceRegistry,
};

/// Creates virtual cursors that share one [`SourceRegistry`] and one set of
/// [`CursorOptions`].
///
/// Every constructor accepts an absent source and then returns `None` instead
/// of failing; errors are reserved for invalid arrangements and unreadable
/// source data.
#[derive(Clone)]
pub struct CursorFactory {
    registry: Arc<SourceRegistry>,
    options: CursorOptions,
}

impl Default for CursorFactory {
    fn default() -> Self {
        CursorFactory::new()
    }
}

impl CursorFactory {
    /// Creates a factory registering cursors with the process-wide registry.
    pub fn new() -> CursorFactory {
        CursorFactory::with_registry(SourceRegistry::global())
    }

    /// Creates a factory registering cursors with `registry`.
    pub fn with_registry(registry: Arc<SourceRegistry>) -> CursorFactory {
        CursorFactory {
            registry,
            options: CursorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CursorOptions) -> CursorFactory {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// Creates a cursor that presents `source` unchanged.
    pub fn identity(&self, source: Option<Arc<dyn RowSource>>) -> Option<VirtualCursor> {
        let source = source?;
        let map = builders::identity_map(source.as_ref());
        Some(self.wrap(source, map))
    }

    /// Creates a cursor from an explicit map: logical row `i` is source row
    /// `map[i]`.
    ///
    /// The map is taken verbatim. A position past the end of the source makes
    /// navigation to that row fail.
    pub fn from_map(
        &self,
        source: Option<Arc<dyn RowSource>>,
        map: impl Into<PositionMap>,
    ) -> Option<VirtualCursor> {
        let source = source?;
        Some(self.wrap(source, map.into()))
    }

    /// Creates a cursor over the rows accepted by `selector`, in source order.
    pub fn from_selector<F>(
        &self,
        source: Option<Arc<dyn RowSource>>,
        selector: F,
    ) -> Result<Option<VirtualCursor>>
    where
        F: FnMut(&dyn RowSource) -> Result<bool>,
    {
        let Some(source) = source else {
            return Ok(None);
        };
        let map = builders::select_map(source.as_ref(), selector)?;
        Ok(Some(self.wrap(source, map)))
    }

    /// Joins `keys` against `column` with [`JoinType::StrictLeftOuter`].
    pub fn from_join<'c, S: AsRef<str>>(
        &self,
        source: Option<Arc<dyn RowSource>>,
        column: impl Into<Column<'c>>,
        keys: &[S],
    ) -> Result<Option<VirtualCursor>> {
        self.from_join_with(source, column, keys, JoinType::default())
    }

    /// Creates a cursor with one row per key, pointing at the source row whose
    /// `column` value equals the key. `join_type` decides what happens to keys
    /// without a match.
    pub fn from_join_with<'c, S: AsRef<str>>(
        &self,
        source: Option<Arc<dyn RowSource>>,
        column: impl Into<Column<'c>>,
        keys: &[S],
        join_type: JoinType,
    ) -> Result<Option<VirtualCursor>> {
        let Some(source) = source else {
            return Ok(None);
        };
        let column = column.into().resolve(source.as_ref())?;
        let map = builders::join_map(source.as_ref(), column, keys, join_type)?;
        Ok(Some(self.wrap(source, map)))
    }

    /// Creates one cursor per distinct value of `column`. NULL values form a
    /// single group.
    pub fn groups<'c>(
        &self,
        source: Option<Arc<dyn RowSource>>,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<CursorGroups>> {
        let Some(source) = source else {
            return Ok(None);
        };
        let column = column.into().resolve(source.as_ref())?;
        let groups = builders::group_maps(source.as_ref(), column)?
            .into_iter()
            .map(|(key, map)| (key, self.wrap(Arc::clone(&source), map)))
            .collect();
        Ok(Some(CursorGroups::new(groups)))
    }

    fn wrap(&self, source: Arc<dyn RowSource>, map: PositionMap) -> VirtualCursor {
        VirtualCursor::new(source, map, Arc::clone(&self.registry), self.options)
    }
}
