//! Structural errors surfaced at the `Sheet` API boundary.
//!
//! These are distinct from the value-level [`sheet_engine::FormulaError`]
//! categories (`#REF`/`#VALUE`/`#ARITHM!`) that get cached as a formula
//! cell's computed value: a `SheetError` means the requested edit or lookup
//! was rejected outright, and the sheet is left exactly as it was before
//! the call.

use sheet_engine::FormulaError;
use thiserror::Error;

/// Errors a [`crate::Sheet`] operation can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The position named in the call falls outside `[0, MAX_ROWS) x
    /// [0, MAX_COLS)`.
    #[error("position is outside the grid")]
    InvalidPosition,

    /// Committing the edit would make some cell reachable from itself
    /// through formula references.
    #[error("circular dependency detected")]
    CircularDependency,

    /// The formula text failed to parse. Carries a [`FormulaError::Syntax`]
    /// — the other three `FormulaError` categories are value-level and
    /// never surface through this variant.
    #[error("formula error: {0}")]
    Formula(#[from] FormulaError),
}

pub type Result<T> = std::result::Result<T, SheetError>;
