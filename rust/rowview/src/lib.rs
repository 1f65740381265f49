//! Row virtualization over seekable row sources.
//!
//! A [`VirtualCursor`] presents a logical sequence of rows (filtered, reordered,
//! repeated, or sparse) on top of a single [`RowSource`] without copying row data.
//! The mapping from logical to physical rows is a
//! [`PositionMap`](rowview_position_map::PositionMap), built by one of the
//! [`builders`] and owned by the cursor.
//!
//! Cursors over the same underlying source share its lifetime through a
//! [`SourceRegistry`]: the source is closed once, when the last cursor over it
//! is closed.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use rowview::{CursorFactory, JoinType, RowSource, SourceRegistry};
//! use rowview_source::{MatrixRowSource, Value};
//!
//! let mut table = MatrixRowSource::new(["_id", "name"]);
//! table.add_row(vec![Value::Integer(0), "Alpha".into()]).unwrap();
//! table.add_row(vec![Value::Integer(1), "Beta".into()]).unwrap();
//! let source: Arc<dyn RowSource> = Arc::new(table);
//!
//! let factory = CursorFactory::with_registry(Arc::new(SourceRegistry::new()));
//! let cursor = factory
//!     .from_join_with(Some(source), "name", &["Beta", "Gamma"], JoinType::LeftOuter)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(cursor.count(), 2);
//! assert!(cursor.move_to_first());
//! assert_eq!(cursor.get_long(0).unwrap(), 1);
//! assert!(cursor.move_to_next());
//! assert!(cursor.is_empty_row().unwrap());
//! ```

pub mod builders;
pub mod cursor;
pub mod factory;
pub mod groups;
pub mod options;
pub mod registry;

#[cfg(test)]
mod tests;

pub use builders::JoinType;
pub use cursor::VirtualCursor;
pub use factory::CursorFactory;
pub use groups::CursorGroups;
pub use options::CursorOptions;
pub use registry::{Release, SourceRegistry, WrapperId};
pub use rowview_position_map::PositionMap;
pub use rowview_source::{Column, RowSource};
