//! The grid: a map of positions to cells, the pending-reference index for
//! positions named by a formula but not yet materialized, and the
//! bookkeeping that keeps the dependency graph acyclic and its caches
//! coherent across edits.

use crate::cell::Cell;
use crate::error::{Result, SheetError};
use sheet_engine::formula::SheetView;
use sheet_engine::{FormulaError, Position, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write as _;

/// What [`Sheet::get_cell`] hands back for a position.
///
/// Mirrors the three-way split in §4.4: a position can be materialized (a
/// real cell lives there), pending (some formula names it but nothing has
/// been set there yet — it reads exactly like an empty cell), or simply
/// absent.
pub enum CellView<'a> {
    Materialized(&'a Cell),
    /// Always observably identical to a fresh [`Cell::new`] — the spec's
    /// single shared sentinel, modeled here as "no instance needed" rather
    /// than a literal shared reference (see `DESIGN.md`).
    Pending,
    None,
}

impl<'a> CellView<'a> {
    /// An owned cell equivalent to what a pending position would read as.
    pub fn empty_cell() -> Cell {
        Cell::new()
    }
}

/// The cell graph: grid storage, dependency tracking, cycle detection, and
/// printable bounds.
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    /// Positions referenced by at least one formula but not materialized,
    /// mapped to the set of formula positions that reference them.
    pending: HashMap<Position, HashSet<Position>>,
    max_row: Option<i32>,
    max_col: Option<i32>,
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::new()
    }
}

impl Sheet {
    pub fn new() -> Sheet {
        Sheet {
            cells: HashMap::new(),
            pending: HashMap::new(),
            max_row: None,
            max_col: None,
        }
    }

    /// `GetPrintableSize()`: `(maxRow+1, maxCol+1)`, or `(0,0)` when empty.
    pub fn printable_size(&self) -> (i32, i32) {
        (
            self.max_row.map_or(0, |r| r + 1),
            self.max_col.map_or(0, |c| c + 1),
        )
    }

    /// `GetCell(pos)`.
    pub fn get_cell(&self, pos: Position) -> Result<CellView<'_>> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        if let Some(cell) = self.cells.get(&pos) {
            return Ok(CellView::Materialized(cell));
        }
        if self.pending.contains_key(&pos) {
            return Ok(CellView::Pending);
        }
        Ok(CellView::None)
    }

    /// `GetValue(pos)` convenience: resolves through pending/absent the
    /// same way a reference would during formula evaluation.
    pub fn get_value(&self, pos: Position) -> Result<Value> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        Ok(match self.cells.get(&pos) {
            Some(cell) => cell.value(self),
            None => Value::Number(0.0),
        })
    }

    /// `SetCell(pos, text)`.
    ///
    /// On any `Err`, the sheet is left byte-for-byte as it was before the
    /// call: the tentative cell is fully built and cycle-checked before any
    /// map, dependent set, pending entry, or bound is touched.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }

        let mut new_cell = Cell::new();
        new_cell.set(text).map_err(SheetError::Formula)?;

        if new_cell.is_formula() && self.would_create_cycle(pos, &new_cell) {
            return Err(SheetError::CircularDependency);
        }

        // Everything past this point cannot fail; commit.
        let prior = self.cells.remove(&pos);
        let prior_refs: HashSet<Position> = prior
            .as_ref()
            .map(|c| c.refs().into_iter().collect())
            .unwrap_or_default();
        let new_refs: HashSet<Position> = new_cell.refs().into_iter().collect();

        for stale in prior_refs.difference(&new_refs) {
            self.drop_dependent(*stale, pos);
        }

        // `pos` keeps whatever dependents it already had (from a prior
        // materialized cell, or from referrers that were pending on it).
        if let Some(mut prior_cell) = prior {
            new_cell.adopt_dependents(&mut prior_cell);
        }
        if let Some(referrers) = self.pending.remove(&pos) {
            let mut dependents = new_cell.dependents().clone();
            dependents.extend(referrers);
            new_cell.set_dependents(dependents);
        }

        for r in &new_refs {
            if self.cells.contains_key(r) {
                self.cells.get_mut(r).unwrap().add_dependent(pos);
            } else {
                self.pending.entry(*r).or_default().insert(pos);
            }
        }

        let invalidate_from: HashSet<Position> = new_cell.dependents().clone();
        new_cell.clear_cache();
        self.cells.insert(pos, new_cell);
        self.invalidate_transitively(invalidate_from);

        self.expand_bounds(pos);
        Ok(())
    }

    /// `ClearCell(pos)`.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        let Some(cell) = self.cells.remove(&pos) else {
            return Ok(());
        };

        for r in cell.refs() {
            self.drop_dependent(r, pos);
        }

        let dependents = cell.dependents().clone();
        if !dependents.is_empty() {
            self.pending.insert(pos, dependents.clone());
        }
        self.invalidate_transitively(dependents);

        if self.max_row == Some(pos.row) || self.max_col == Some(pos.col) {
            self.recompute_bounds();
        }
        Ok(())
    }

    /// `PrintTexts`: tab-separated `GetText()` over the printable box.
    pub fn print_texts(&self) -> String {
        self.print_with(|cell| cell.get_text().to_string())
    }

    /// `PrintValues`: tab-separated `GetValue()` over the printable box.
    pub fn print_values(&self) -> String {
        self.print_with(|cell| cell.value(self).to_string())
    }

    fn print_with(&self, render: impl Fn(&Cell) -> String) -> String {
        let (rows, cols) = self.printable_size();
        let mut out = String::new();
        for r in 0..rows {
            for c in 0..cols {
                if c > 0 {
                    out.push('\t');
                }
                if let Some(cell) = self.cells.get(&Position::new(r, c)) {
                    let _ = write!(out, "{}", render(cell));
                }
            }
            out.push('\n');
        }
        out
    }

    /// Remove `dependent` from whichever bookkeeping currently tracks
    /// references to `target` — its materialized cell's dependent set, or
    /// its pending-reference entry, dropping the entry entirely once empty.
    fn drop_dependent(&mut self, target: Position, dependent: Position) {
        if let Some(cell) = self.cells.get_mut(&target) {
            cell.remove_dependent(dependent);
            return;
        }
        if let Some(referrers) = self.pending.get_mut(&target) {
            referrers.remove(&dependent);
            if referrers.is_empty() {
                self.pending.remove(&target);
            }
        }
    }

    /// Clear the cache of every formula cell reachable from `start` by
    /// following dependent edges (who-reads-me, not who-I-reference), via
    /// an explicit queue rather than recursion.
    fn invalidate_transitively(&mut self, start: HashSet<Position>) {
        let mut queue: VecDeque<Position> = start.into_iter().collect();
        let mut visited: HashSet<Position> = HashSet::new();
        while let Some(pos) = queue.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            if let Some(cell) = self.cells.get_mut(&pos) {
                cell.clear_cache();
                queue.extend(cell.dependents().iter().copied());
            }
        }
    }

    /// Tri-colored, explicit-stack DFS (Design Notes): would committing
    /// `new_cell` at `pos` make `pos` reachable from itself through formula
    /// references? Traverses only materialized cells plus the tentative
    /// `new_cell` standing in for `pos`; pending positions have no outgoing
    /// edges.
    fn would_create_cycle(&self, pos: Position, new_cell: &Cell) -> bool {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            Gray,
            Black,
        }
        struct Frame {
            pos: Position,
            children: Vec<Position>,
            next: usize,
        }

        let children_of = |p: Position| -> Vec<Position> {
            if p == pos {
                new_cell.refs()
            } else {
                self.cells.get(&p).map(Cell::refs).unwrap_or_default()
            }
        };

        let mut color: HashMap<Position, Color> = HashMap::new();
        let mut stack = vec![Frame {
            pos,
            children: children_of(pos),
            next: 0,
        }];
        color.insert(pos, Color::Gray);

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.children.len() {
                color.insert(frame.pos, Color::Black);
                stack.pop();
                continue;
            }
            let child = frame.children[frame.next];
            frame.next += 1;
            match color.get(&child) {
                Some(Color::Gray) => return true,
                Some(Color::Black) => {}
                None => {
                    color.insert(child, Color::Gray);
                    let kids = children_of(child);
                    stack.push(Frame {
                        pos: child,
                        children: kids,
                        next: 0,
                    });
                }
            }
        }
        false
    }

    fn expand_bounds(&mut self, pos: Position) {
        self.max_row = Some(self.max_row.map_or(pos.row, |r| r.max(pos.row)));
        self.max_col = Some(self.max_col.map_or(pos.col, |c| c.max(pos.col)));
    }

    fn recompute_bounds(&mut self) {
        self.max_row = self.cells.keys().map(|p| p.row).max();
        self.max_col = self.cells.keys().map(|p| p.col).max();
    }
}

impl SheetView for Sheet {
    fn cell_value(&self, pos: Position) -> std::result::Result<f64, FormulaError> {
        if !pos.is_valid() {
            return Err(FormulaError::Ref);
        }
        match self.cells.get(&pos) {
            Some(cell) => cell.numeric_value(self),
            None => Ok(0.0),
        }
    }
}
