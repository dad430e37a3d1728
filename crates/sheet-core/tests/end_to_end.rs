//! End-to-end scenarios against the public `Sheet` API, mirroring the
//! literal worked examples used to validate the cell graph's invariants.

use sheet_core::{CellView, Sheet, SheetError};
use sheet_engine::{FormulaError, Position, Value};

fn pos(a1: &str) -> Position {
    Position::from_a1(a1)
}

fn text_of(sheet: &Sheet, a1: &str) -> String {
    match sheet.get_cell(pos(a1)).unwrap() {
        CellView::Materialized(cell) => cell.get_text().to_string(),
        CellView::Pending => String::new(),
        CellView::None => String::new(),
    }
}

#[test]
fn arithmetic_worked_example() {
    let mut sheet = Sheet::new();
    sheet
        .set_cell(pos("A1"), "=(12+13) * (14+(13-24/(1+1))*55-46)")
        .unwrap();
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Number(575.0));
}

#[test]
fn empty_cell_as_zero() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=B2").unwrap();
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Number(0.0));
    assert_eq!(sheet.printable_size(), (1, 1));
}

#[test]
fn escape_preserves_text_and_strips_on_value() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A3"), "'=escaped").unwrap();
    assert_eq!(text_of(&sheet, "A3"), "'=escaped");
    assert_eq!(
        sheet.get_value(pos("A3")).unwrap(),
        Value::Text("=escaped".to_string())
    );
}

#[test]
fn value_error_from_non_numeric_text_cell() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("E2"), "A1").unwrap();
    sheet.set_cell(pos("E4"), "=E2").unwrap();
    assert_eq!(
        sheet.get_value(pos("E4")).unwrap(),
        Value::Error(FormulaError::Value)
    );
}

#[test]
fn arithmetic_error_from_division_by_zero() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=1/0").unwrap();
    assert_eq!(
        sheet.get_value(pos("A1")).unwrap(),
        Value::Error(FormulaError::Arithmetic)
    );
}

#[test]
fn cycle_rejection_leaves_prior_text_intact() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("E2"), "=E4").unwrap();
    sheet.set_cell(pos("E4"), "=X9").unwrap();
    sheet.set_cell(pos("X9"), "=M6").unwrap();
    sheet.set_cell(pos("M6"), "Ready").unwrap();

    let err = sheet.set_cell(pos("M6"), "=E2").unwrap_err();
    assert_eq!(err, SheetError::CircularDependency);
    assert_eq!(text_of(&sheet, "M6"), "Ready");
}

#[test]
fn printable_shrinkage_trace() {
    let mut sheet = Sheet::new();
    for i in 0..6 {
        sheet.set_cell(Position::new(i, i), &i.to_string()).unwrap();
    }
    sheet.clear_cell(Position::new(3, 3)).unwrap();
    assert_eq!(sheet.printable_size(), (6, 6));

    let expected = [(5, 5), (3, 3), (3, 3), (2, 2), (1, 1), (0, 0)];
    for (i, want) in (0..6).rev().zip(expected) {
        sheet.clear_cell(Position::new(i, i)).unwrap();
        assert_eq!(sheet.printable_size(), want);
    }
}

#[test]
fn edit_atomicity_on_formula_syntax_error() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("M7"), "string").unwrap();
    let err = sheet.set_cell(pos("M7"), "=qwerty").unwrap_err();
    assert!(matches!(err, SheetError::Formula(FormulaError::Syntax(_))));
    assert_eq!(text_of(&sheet, "M7"), "string");
}

#[test]
fn invalid_position_is_rejected_for_every_op() {
    let mut sheet = Sheet::new();
    let bad = Position::new(-1, 0);
    assert_eq!(sheet.set_cell(bad, "1").unwrap_err(), SheetError::InvalidPosition);
    assert_eq!(sheet.get_value(bad).unwrap_err(), SheetError::InvalidPosition);
    assert_eq!(sheet.clear_cell(bad).unwrap_err(), SheetError::InvalidPosition);
}

#[test]
fn out_of_grid_reference_is_rejected_at_set_time() {
    let mut sheet = Sheet::new();
    let err = sheet.set_cell(pos("A1"), "=XFE16384").unwrap_err();
    assert!(matches!(err, SheetError::Formula(FormulaError::Syntax(_))));
}
