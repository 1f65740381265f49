use rowview_common::Result;
use rowview_position_map::PositionMap;
use rowview_source::RowSource;

use super::{ScanFlow, scan_rows};

/// Selects the rows of `source` for which `selector` returns `true`, in source
/// order.
///
/// The selector is called once per row with the source positioned at that row.
/// It may keep state between calls, e.g. to resolve a column index on its first
/// invocation. A selector error aborts the scan.
pub fn select_map<F>(source: &dyn RowSource, mut selector: F) -> Result<PositionMap>
where
    F: FnMut(&dyn RowSource) -> Result<bool>,
{
    let mut map = PositionMap::new();
    scan_rows(source, |position| {
        if selector(source)? {
            map.push(position);
        }
        Ok(ScanFlow::Continue)
    })?;
    Ok(map)
}
