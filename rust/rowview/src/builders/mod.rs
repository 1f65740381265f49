//! Position map builders.
//!
//! Every builder scans its source at most once, sequentially from the first to
//! the last row, and returns a fresh [`PositionMap`](rowview_position_map::PositionMap).
//! Builders leave the source positioned wherever the scan ended.

pub mod grouping;
pub mod join;
pub mod selection;

pub use grouping::group_maps;
pub use join::{JoinType, join_map};
pub use selection::select_map;

use rowview_common::Result;
use rowview_position_map::PositionMap;
use rowview_source::RowSource;

/// Identity map over the current rows of `source`.
pub fn identity_map(source: &dyn RowSource) -> PositionMap {
    PositionMap::identity(source.count())
}

/// Visits every row of `source` in order, passing the row's position.
pub(crate) fn scan_rows(
    source: &dyn RowSource,
    mut visit: impl FnMut(u64) -> Result<ScanFlow>,
) -> Result<()> {
    let mut more = source.move_to_first();
    while more {
        if let ScanFlow::Stop = visit(source.position() as u64)? {
            break;
        }
        more = source.move_to_next();
    }
    Ok(())
}

pub(crate) enum ScanFlow {
    Continue,
    Stop,
}
