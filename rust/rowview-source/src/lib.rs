//! The row source capability consumed by the rowview virtualization layer.
//!
//! A row source is a sequential, randomly-seekable cursor over a finite table
//! exposing column-indexed typed reads and a close operation. Concrete adapters
//! implement [`RowSource`]; [`MatrixRowSource`] is an in-memory implementation.

pub mod column;
pub mod matrix;
pub mod row_source;
pub mod value;

pub use column::Column;
pub use matrix::MatrixRowSource;
pub use row_source::{RowSource, SourceId, resolve_root};
pub use value::Value;
