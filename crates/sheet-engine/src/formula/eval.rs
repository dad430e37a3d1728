//! Evaluates a parsed [`Expr`] against a sheet of cells.
//!
//! This module knows nothing about how a sheet stores its cells — it only
//! asks a [`SheetView`] for the numeric value of a referenced position.
//! Resolving what "the numeric value of a cell" means (empty cells read as
//! zero, text cells parse-or-error, formula cells reuse their cache) is
//! `sheet-core`'s job.

use super::ast::Expr;
use crate::position::Position;
use crate::value::FormulaError;

/// What a formula needs from the sheet it is evaluating against: the
/// numeric value of any in-grid cell it references.
///
/// Implementations are expected to have already confirmed `pos` is valid —
/// [`crate::formula::parse`] rejects out-of-grid references before an
/// [`Expr`] can even be built, so `eval` never asks for one.
pub trait SheetView {
    fn cell_value(&self, pos: Position) -> Result<f64, FormulaError>;
}

/// Evaluate `expr` to a number, or the first error encountered.
///
/// Errors from referenced cells propagate unchanged. A result that is not
/// finite (overflow, or division by zero) becomes [`FormulaError::Arithmetic`]
/// at the operation that produced it.
pub fn eval(expr: &Expr, sheet: &dyn SheetView) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Ref(pos) => sheet.cell_value(*pos),
        Expr::Neg(inner) => checked(-eval(inner, sheet)?),
        Expr::Plus(inner) => eval(inner, sheet),
        Expr::Add(a, b) => checked(eval(a, sheet)? + eval(b, sheet)?),
        Expr::Sub(a, b) => checked(eval(a, sheet)? - eval(b, sheet)?),
        Expr::Mul(a, b) => checked(eval(a, sheet)? * eval(b, sheet)?),
        Expr::Div(a, b) => {
            let lhs = eval(a, sheet)?;
            let rhs = eval(b, sheet)?;
            if rhs == 0.0 {
                return Err(FormulaError::Arithmetic);
            }
            checked(lhs / rhs)
        }
    }
}

/// Reject non-finite results (overflow to infinity, or NaN) as an
/// arithmetic error rather than letting them leak into a cell's cache.
fn checked(n: f64) -> Result<f64, FormulaError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(FormulaError::Arithmetic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parser::parse;
    use std::collections::HashMap;

    struct FakeSheet(HashMap<Position, Result<f64, FormulaError>>);

    impl SheetView for FakeSheet {
        fn cell_value(&self, pos: Position) -> Result<f64, FormulaError> {
            self.0.get(&pos).cloned().unwrap_or(Ok(0.0))
        }
    }

    fn eval_str(text: &str, sheet: &FakeSheet) -> Result<f64, FormulaError> {
        eval(&parse(text).unwrap(), sheet)
    }

    #[test]
    fn absent_reference_reads_as_zero() {
        let sheet = FakeSheet(HashMap::new());
        assert_eq!(eval_str("A1+1", &sheet), Ok(1.0));
    }

    #[test]
    fn referenced_error_propagates() {
        let mut cells = HashMap::new();
        cells.insert(Position::new(0, 0), Err(FormulaError::Value));
        let sheet = FakeSheet(cells);
        assert_eq!(eval_str("A1+1", &sheet), Err(FormulaError::Value));
    }

    #[test]
    fn division_by_zero_is_arithmetic_error() {
        let sheet = FakeSheet(HashMap::new());
        assert_eq!(eval_str("1/0", &sheet), Err(FormulaError::Arithmetic));
        assert_eq!(eval_str("0/0", &sheet), Err(FormulaError::Arithmetic));
    }

    #[test]
    fn overflow_is_arithmetic_error() {
        let sheet = FakeSheet(HashMap::new());
        let huge = format!("{}*{}", f64::MAX, f64::MAX);
        assert_eq!(eval_str(&huge, &sheet), Err(FormulaError::Arithmetic));
    }

    #[test]
    fn unary_negation_propagates_errors() {
        let mut cells = HashMap::new();
        cells.insert(Position::new(0, 0), Err(FormulaError::Ref));
        let sheet = FakeSheet(cells);
        assert_eq!(eval_str("-A1", &sheet), Err(FormulaError::Ref));
    }
}
