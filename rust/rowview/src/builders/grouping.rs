use ahash::AHashMap;
use rowview_common::Result;
use rowview_position_map::PositionMap;
use rowview_source::RowSource;

use super::{ScanFlow, scan_rows};

/// Splits the rows of `source` by the text value of `column`.
///
/// Returns one map per distinct value, in order of first appearance. NULL values
/// form a single group keyed by `None`. Rows keep their source order within each
/// group.
pub fn group_maps(
    source: &dyn RowSource,
    column: usize,
) -> Result<Vec<(Option<String>, PositionMap)>> {
    let mut groups: Vec<(Option<String>, PositionMap)> = Vec::new();
    let mut lookup: AHashMap<Option<String>, usize> = AHashMap::new();

    scan_rows(source, |position| {
        let key = source.get_string(column)?;
        let index = match lookup.get(&key) {
            Some(&index) => index,
            None => {
                lookup.insert(key.clone(), groups.len());
                groups.push((key, PositionMap::new()));
                groups.len() - 1
            }
        };
        groups[index].1.push(position);
        Ok(ScanFlow::Continue)
    })?;

    Ok(groups)
}
