//! The formula language layer: cell coordinates, the value/error model, and
//! the formula grammar's parser, canonical printer, and evaluator.
//!
//! This crate has no notion of a sheet or a cell graph — it is the pure,
//! dependency-free language underneath `sheet-core`.

pub mod formula;
pub mod position;
pub mod value;

pub use position::Position;
pub use value::{FormulaError, Value};
