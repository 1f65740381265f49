//! Logical-to-physical row position map.
//!
//! A `PositionMap` is the indirection array behind every virtual row view: the
//! slot at index `i` holds the physical position of logical row `i` in the wrapped
//! row source, or nothing at all when the logical row has no backing data (an
//! "empty" slot, produced e.g. by a left outer join).
//!
//! Key properties
//! - The map length is the logical row count and is independent of the source's
//!   row count: positions may be dropped, repeated or reordered freely.
//! - Present positions are not validated against the source; an out-of-range
//!   position surfaces later as a failed seek.
//! - Index-based mutations (`swap`, `set`, `rearrange`) are bounds-checked and
//!   fail with `IndexOutOfRange` instead of panicking.

use std::fmt;

use rowview_common::{Result, error::Error, verify_index};

/// Reserved raw value marking an empty slot.
const EMPTY: u64 = u64::MAX;

/// An ordered sequence of optional physical row positions.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct PositionMap {
    slots: Vec<u64>,
}

impl PositionMap {
    /// Creates a zero-length map.
    pub fn new() -> PositionMap {
        PositionMap { slots: Vec::new() }
    }

    /// Creates the identity map `[0, 1, ..., count - 1]`.
    pub fn identity(count: u64) -> PositionMap {
        PositionMap {
            slots: (0..count).collect(),
        }
    }

    /// Creates a map of `len` empty slots.
    pub fn empty_slots(len: usize) -> PositionMap {
        PositionMap {
            slots: vec![EMPTY; len],
        }
    }

    /// Creates a map from a list of physical positions, one slot per position.
    ///
    /// `u64::MAX` is reserved and ends up as an empty slot.
    pub fn from_positions(positions: impl IntoIterator<Item = u64>) -> PositionMap {
        PositionMap {
            slots: positions.into_iter().collect(),
        }
    }

    /// Creates a map from signed positions, where every negative value denotes
    /// an empty slot.
    pub fn from_signed(positions: &[i64]) -> PositionMap {
        positions
            .iter()
            .map(|&pos| u64::try_from(pos).ok())
            .collect()
    }

    /// Returns the number of logical rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot at `index`, or `None` if `index` is out of bounds.
    ///
    /// The inner `Option` is `None` for an empty slot.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Option<u64>> {
        self.slots.get(index).map(|&raw| decode(raw))
    }

    /// Returns the physical position stored at `index`.
    pub fn physical(&self, index: usize) -> Result<Option<u64>> {
        self.get(index)
            .ok_or_else(|| Error::index_out_of_range(index, self.len()))
    }

    /// Returns `true` if the slot at `index` has no backing row.
    pub fn is_empty_slot(&self, index: usize) -> Result<bool> {
        self.physical(index).map(|slot| slot.is_none())
    }

    /// Overwrites the slot at `index`.
    pub fn set(&mut self, index: usize, position: Option<u64>) -> Result<()> {
        verify_index!(index, self.len());
        self.slots[index] = encode(position);
        Ok(())
    }

    #[inline]
    pub fn push(&mut self, position: u64) {
        self.slots.push(position);
    }

    #[inline]
    pub fn push_empty(&mut self) {
        self.slots.push(EMPTY);
    }

    /// Swaps two slots in place.
    pub fn swap(&mut self, first: usize, second: usize) -> Result<()> {
        verify_index!(first, self.len());
        verify_index!(second, self.len());
        self.slots.swap(first, second);
        Ok(())
    }

    /// Builds a new map where slot `i` is `self[arrangement[i]]`.
    ///
    /// The arrangement addresses the current logical order of this map, so
    /// `a.rearrange(x)?.rearrange(y)?` equals `a.rearrange(z)?` with
    /// `z[i] = x[y[i]]`. Any index outside `[0, len)` fails the whole operation
    /// and leaves nothing half-built.
    pub fn rearrange(&self, arrangement: &[usize]) -> Result<PositionMap> {
        let len = self.len();
        let slots = arrangement
            .iter()
            .map(|&index| {
                self.slots
                    .get(index)
                    .copied()
                    .ok_or_else(|| Error::index_out_of_range(index, len))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PositionMap { slots })
    }

    /// Removes every empty slot, preserving the order of the remaining ones.
    pub fn compact(&mut self) {
        self.slots.retain(|&raw| raw != EMPTY);
    }

    /// Returns the indices of the empty slots, in ascending order.
    pub fn empty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|&(_, &raw)| raw == EMPTY)
            .map(|(index, _)| index)
    }

    pub fn has_empty_slots(&self) -> bool {
        self.slots.contains(&EMPTY)
    }

    /// Returns `true` if this map is the identity over a source of `count` rows.
    pub fn is_identity(&self, count: u64) -> bool {
        self.slots.len() as u64 == count
            && self
                .slots
                .iter()
                .enumerate()
                .all(|(index, &raw)| raw == index as u64)
    }

    /// Iterates over the slots in logical order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<u64>> + '_ {
        self.slots.iter().map(|&raw| decode(raw))
    }

    /// Returns a snapshot where empty slots are surfaced as `-1`.
    pub fn to_signed(&self) -> Vec<i64> {
        self.iter()
            .map(|slot| slot.map_or(-1, |pos| pos as i64))
            .collect()
    }
}

impl FromIterator<Option<u64>> for PositionMap {
    fn from_iter<I: IntoIterator<Item = Option<u64>>>(iter: I) -> Self {
        PositionMap {
            slots: iter.into_iter().map(encode).collect(),
        }
    }
}

impl From<Vec<u64>> for PositionMap {
    fn from(slots: Vec<u64>) -> Self {
        PositionMap { slots }
    }
}

impl fmt::Debug for PositionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[inline]
fn decode(raw: u64) -> Option<u64> {
    (raw != EMPTY).then_some(raw)
}

#[inline]
fn encode(position: Option<u64>) -> u64 {
    position.unwrap_or(EMPTY)
}
