use rowview_common::{Result, error::Error};

use crate::RowSource;

/// Reference to a source column, either by position or by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column<'a> {
    Index(usize),
    Name(&'a str),
}

impl Column<'_> {
    /// Resolves the reference to a column index of `source`.
    ///
    /// Fails with `ColumnNotFound` for an unknown name and `InvalidArgument` for
    /// an index past the last column.
    pub fn resolve(self, source: &dyn RowSource) -> Result<usize> {
        match self {
            Column::Index(index) => {
                let count = source.column_count();
                if index < count {
                    Ok(index)
                } else {
                    Err(Error::invalid_arg(
                        "column",
                        format!("index {index} exceeds column count {count}"),
                    ))
                }
            }
            Column::Name(name) => source
                .column_index(name)
                .ok_or_else(|| Error::column_not_found(name)),
        }
    }
}

impl From<usize> for Column<'_> {
    fn from(index: usize) -> Self {
        Column::Index(index)
    }
}

impl<'a> From<&'a str> for Column<'a> {
    fn from(name: &'a str) -> Self {
        Column::Name(name)
    }
}

impl<'a> From<&'a String> for Column<'a> {
    fn from(name: &'a String) -> Self {
        Column::Name(name.as_str())
    }
}
