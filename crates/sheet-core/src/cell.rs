//! A single grid slot: empty, text, or formula.
//!
//! A `Cell` owns its parsed formula AST (if any), its evaluation cache, and
//! the set of positions that depend on it. It knows nothing about where it
//! lives in a sheet or how to resolve other cells — evaluation is driven
//! through the [`sheet_engine::formula::SheetView`] trait object handed in
//! by the caller, which in practice is always [`crate::Sheet`].

use sheet_engine::formula::{self, SheetView};
use sheet_engine::{FormulaError, Position, Value};
use std::cell::RefCell;
use std::collections::HashSet;

/// What a cell currently holds.
#[derive(Clone, Debug)]
enum CellKind {
    Empty,
    /// `escaped` is true for text entered with a leading `'` escape; it
    /// controls whether [`Cell::text_payload`] strips that leading byte.
    Text { escaped: bool },
    Formula {
        ast: formula::Expr,
        cache: RefCell<Option<Result<f64, FormulaError>>>,
    },
}

/// One grid slot.
///
/// `stored_text` is what [`Cell::get_text`] returns verbatim: the original
/// input for text cells (escape character included), or `=` followed by the
/// canonical printed expression for formula cells. `dependents` survives
/// cell replacement — it names *other* cells' formulas, not this cell's own
/// content, so editing this cell's text must never disturb it.
#[derive(Clone, Debug)]
pub struct Cell {
    kind: CellKind,
    stored_text: String,
    dependents: HashSet<Position>,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            kind: CellKind::Empty,
            stored_text: String::new(),
            dependents: HashSet::new(),
        }
    }
}

impl Cell {
    /// A fresh, empty cell with no dependents.
    pub fn new() -> Cell {
        Cell::default()
    }

    /// Classify `text` per the cell-text grammar (§6) and, for formulas,
    /// parse it. Builds a wholly new cell state without touching `self`, so
    /// a caller can discard the result on error without ever observing a
    /// partially-updated cell.
    fn classify(text: &str) -> Result<(CellKind, String), FormulaError> {
        if text.is_empty() {
            return Ok((CellKind::Empty, String::new()));
        }
        if let Some(stripped) = text.strip_prefix('\'') {
            if !stripped.is_empty() {
                return Ok((CellKind::Text { escaped: true }, text.to_string()));
            }
        }
        if let Some(body) = text.strip_prefix('=') {
            if !body.is_empty() {
                let ast = formula::parse(body)?;
                let canonical = format!("={}", formula::print(&ast));
                return Ok((
                    CellKind::Formula {
                        ast,
                        cache: RefCell::new(None),
                    },
                    canonical,
                ));
            }
        }
        Ok((CellKind::Text { escaped: false }, text.to_string()))
    }

    /// Replace this cell's content per §4.3's `Set` rules.
    ///
    /// On `Err`, `self` is left completely unchanged (dependents included) —
    /// the new state is fully built before anything is assigned.
    pub fn set(&mut self, text: &str) -> Result<(), FormulaError> {
        let (kind, stored_text) = Self::classify(text)?;
        self.kind = kind;
        self.stored_text = stored_text;
        Ok(())
    }

    /// Reset to Empty. Dependents are left untouched — whether other
    /// formulas reference this position doesn't change just because its
    /// own content did.
    pub fn clear(&mut self) {
        self.kind = CellKind::Empty;
        self.stored_text = String::new();
    }

    /// `GetText()`: the verbatim stored text.
    pub fn get_text(&self) -> &str {
        &self.stored_text
    }

    /// True iff this cell holds a formula.
    pub fn is_formula(&self) -> bool {
        matches!(self.kind, CellKind::Formula { .. })
    }

    /// The distinct positions this cell's formula references, in order of
    /// first occurrence. Empty for non-formula cells.
    pub fn refs(&self) -> Vec<Position> {
        match &self.kind {
            CellKind::Formula { ast, .. } => ast.refs(),
            _ => Vec::new(),
        }
    }

    /// The text payload after stripping a single leading escape `'`, when
    /// this is an escaped text cell. Unused for other kinds.
    fn text_payload(&self) -> &str {
        match &self.kind {
            CellKind::Text { escaped: true } => {
                self.stored_text.strip_prefix('\'').unwrap_or(&self.stored_text)
            }
            _ => &self.stored_text,
        }
    }

    /// Drop any cached formula result. A no-op for non-formula cells.
    pub fn clear_cache(&mut self) {
        if let CellKind::Formula { cache, .. } = &mut self.kind {
            *cache.get_mut() = None;
        }
    }

    /// This cell's dependents: formula cells elsewhere in the sheet whose
    /// AST names this cell's position.
    pub fn dependents(&self) -> &HashSet<Position> {
        &self.dependents
    }

    /// `IsReferenced()`.
    pub fn is_referenced(&self) -> bool {
        !self.dependents.is_empty()
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.dependents.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.dependents.remove(&pos);
    }

    /// Move `from`'s dependents onto `self`. Used by `Sheet::set_cell` when
    /// replacing a materialized cell: the new cell's content may differ
    /// entirely, but whoever depended on this *position* still does.
    pub(crate) fn adopt_dependents(&mut self, from: &mut Cell) {
        self.dependents = std::mem::take(&mut from.dependents);
    }

    pub(crate) fn set_dependents(&mut self, dependents: HashSet<Position>) {
        self.dependents = dependents;
    }

    /// Numeric value per §4.2 Eval's reference-resolution rule: empty reads
    /// as zero, text parses-or-`Value`-errors, formula reuses or fills its
    /// cache. `sheet` is consulted only when this cell is a formula and its
    /// cache is empty.
    pub(crate) fn numeric_value(&self, sheet: &dyn SheetView) -> Result<f64, FormulaError> {
        match &self.kind {
            CellKind::Empty => Ok(0.0),
            CellKind::Text { .. } => self
                .text_payload()
                .parse::<f64>()
                .map_err(|_| FormulaError::Value),
            CellKind::Formula { ast, cache } => {
                if let Some(cached) = cache.borrow().clone() {
                    return cached;
                }
                let result = formula::eval(ast, sheet);
                *cache.borrow_mut() = Some(result.clone());
                result
            }
        }
    }

    /// `GetValue()`.
    pub fn value(&self, sheet: &dyn SheetView) -> Value {
        match &self.kind {
            CellKind::Text { .. } => match self.numeric_value(sheet) {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Text(self.text_payload().to_string()),
            },
            CellKind::Empty => Value::Number(0.0),
            CellKind::Formula { .. } => match self.numeric_value(sheet) {
                Ok(n) => Value::Number(n),
                Err(e) => Value::Error(e),
            },
        }
    }
}
