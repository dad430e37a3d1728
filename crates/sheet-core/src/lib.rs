//! The cell graph: grid storage, dependency tracking, cycle detection, and
//! printable bounds, built on `sheet-engine`'s formula language.
//!
//! `Sheet` owns every `Cell` in the grid and is the only way to mutate one —
//! `SetCell`/`ClearCell` are the sole writers, and both keep the dependency
//! graph acyclic and every reachable cache coherent as a side effect of a
//! successful call.

pub mod cell;
pub mod error;
pub mod sheet;

pub use cell::Cell;
pub use error::{Result, SheetError};
pub use sheet::{CellView, Sheet};
