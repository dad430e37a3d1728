//! The value a cell or formula produces: a number, a string, or an error.

use std::fmt;
use thiserror::Error;

/// A computed cell value: a double, a string, or a [`FormulaError`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Error(e) => write!(f, "{e}"),
        }
    }
}

/// An error produced while evaluating a formula.
///
/// `Ref`/`Value`/`Arithmetic` are the three value-level categories a cached
/// cell value can hold, per the spreadsheet's error model. `Syntax` is a
/// fourth, internal-only category: it is the error channel for [`parse`]
/// failures and is never itself stored as a cell's cached value — see
/// `SPEC_FULL.md`'s REDESIGN FLAGS.
///
/// [`parse`]: crate::formula::parse
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormulaError {
    /// A formula referenced a position outside the grid.
    #[error("#REF")]
    Ref,
    /// An operand could not be converted to a number.
    #[error("#VALUE")]
    Value,
    /// Division by zero, or a result that overflowed to infinity or NaN.
    #[error("#ARITHM!")]
    Arithmetic,
    /// The formula text was not a well-formed expression. Never cached as a
    /// cell's value; only ever returned from parsing.
    #[error("formula syntax error: {0}")]
    Syntax(String),
}

impl FormulaError {
    /// The three-letter/symbol tag this error renders as in `PrintValues`
    /// output. Panics on `Syntax`, which never reaches a rendered cell.
    pub fn category_tag(&self) -> &'static str {
        match self {
            FormulaError::Ref => "#REF",
            FormulaError::Value => "#VALUE",
            FormulaError::Arithmetic => "#ARITHM!",
            FormulaError::Syntax(_) => {
                unreachable!("syntax errors are never cached as a cell value")
            }
        }
    }
}
