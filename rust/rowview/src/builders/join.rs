//! Join of an ordered key list (the left table) against one source column (the
//! right table).
//!
//! The result has one slot per key, in key-list order, pointing at the source row
//! that matched the key. Duplicate keys are resolved with a per-key FIFO queue of
//! pending key indices:
//! - the first source row carrying a key value is assigned to every pending index
//!   of that value;
//! - if more than one index is still pending, the earliest one is settled and the
//!   next source row with the same value re-points the remaining ones;
//! - once a single index is left, the value is settled for good.
//!
//! With one source row per value, all duplicates of a key share that row. With
//! several, the k-th occurrence in the source is used from the k-th duplicate on.
//!
//! NULL source values never match: keys are text and SQL NULL joins nothing.

use std::collections::VecDeque;

use ahash::AHashMap;
use itertools::Itertools;
use rowview_common::{Result, error::Error};
use rowview_position_map::PositionMap;
use rowview_source::RowSource;

use super::{ScanFlow, scan_rows};

/// Governs what happens to keys without a matching source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    /// Unmatched keys stay in the result as empty rows.
    LeftOuter,
    /// Like [`JoinType::LeftOuter`], but any unmatched key fails the join with
    /// `JoinViolation`.
    #[default]
    StrictLeftOuter,
    /// Unmatched keys are removed from the result.
    Inner,
}

/// Joins `keys` against the text values of `column` in `source`.
///
/// An empty key list produces an empty map without scanning the source.
pub fn join_map<S: AsRef<str>>(
    source: &dyn RowSource,
    column: usize,
    keys: &[S],
    join_type: JoinType,
) -> Result<PositionMap> {
    if keys.is_empty() {
        return Ok(PositionMap::new());
    }

    let mut map = PositionMap::empty_slots(keys.len());
    let mut pending: AHashMap<&str, VecDeque<usize>> = AHashMap::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        pending.entry(key.as_ref()).or_default().push_back(index);
    }

    scan_rows(source, |position| {
        if let Some(value) = source.get_string(column)? {
            if let Some(queue) = pending.get_mut(value.as_str()) {
                for &index in queue.iter() {
                    map.set(index, Some(position))?;
                }
                if queue.len() > 1 {
                    queue.pop_front();
                } else {
                    pending.remove(value.as_str());
                }
            }
        }
        Ok(if pending.is_empty() {
            ScanFlow::Stop
        } else {
            ScanFlow::Continue
        })
    })?;

    match join_type {
        JoinType::LeftOuter => {}
        JoinType::Inner => map.compact(),
        JoinType::StrictLeftOuter => {
            if map.has_empty_slots() {
                let values = map
                    .empty_indices()
                    .map(|index| keys[index].as_ref())
                    .unique()
                    .map(str::to_string)
                    .collect();
                let column_name = source
                    .column_name(column)
                    .unwrap_or_else(|| format!("#{column}"));
                return Err(Error::join_violation(column_name, values));
            }
        }
    }
    Ok(map)
}
