use ahash::AHashMap;

use crate::VirtualCursor;

/// Virtual cursors produced by grouping a source on one column, keyed by the
/// column value.
///
/// Groups keep the order in which their key first appeared in the source. The
/// group of NULL values is keyed by `None`.
pub struct CursorGroups {
    groups: Vec<(Option<String>, VirtualCursor)>,
    by_value: AHashMap<String, usize>,
    null_group: Option<usize>,
}

impl CursorGroups {
    pub(crate) fn new(groups: Vec<(Option<String>, VirtualCursor)>) -> CursorGroups {
        let mut result = CursorGroups {
            groups,
            by_value: AHashMap::new(),
            null_group: None,
        };
        result.reindex();
        result
    }

    fn reindex(&mut self) {
        self.by_value.clear();
        self.null_group = None;
        for (index, (key, _)) in self.groups.iter().enumerate() {
            match key {
                Some(value) => {
                    self.by_value.insert(value.clone(), index);
                }
                None => self.null_group = Some(index),
            }
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the group of rows whose column value is `value`.
    pub fn get(&self, value: &str) -> Option<&VirtualCursor> {
        self.by_value
            .get(value)
            .map(|&index| &self.groups[index].1)
    }

    /// Returns the group of rows whose column value is NULL.
    pub fn null_group(&self) -> Option<&VirtualCursor> {
        self.null_group.map(|index| &self.groups[index].1)
    }

    /// Returns the group for `key`, where `None` addresses the NULL group.
    pub fn get_key(&self, key: Option<&str>) -> Option<&VirtualCursor> {
        match key {
            Some(value) => self.get(value),
            None => self.null_group(),
        }
    }

    pub fn contains_key(&self, key: Option<&str>) -> bool {
        self.get_key(key).is_some()
    }

    /// Keys in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = Option<&str>> {
        self.groups.iter().map(|(key, _)| key.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &VirtualCursor)> {
        self.groups
            .iter()
            .map(|(key, cursor)| (key.as_deref(), cursor))
    }

    /// Takes the group for `key` out of the collection. The remaining groups
    /// keep their order.
    pub fn remove(&mut self, key: Option<&str>) -> Option<VirtualCursor> {
        let index = match key {
            Some(value) => *self.by_value.get(value)?,
            None => self.null_group?,
        };
        let (_, cursor) = self.groups.remove(index);
        self.reindex();
        Some(cursor)
    }

    /// Closes every group. The shared source is closed once the last open cursor
    /// over it is gone.
    pub fn close_all(&self) {
        for (_, cursor) in &self.groups {
            cursor.close();
        }
    }
}

impl IntoIterator for CursorGroups {
    type Item = (Option<String>, VirtualCursor);
    type IntoIter = std::vec::IntoIter<(Option<String>, VirtualCursor)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl std::fmt::Debug for CursorGroups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
