//! Spreadsheet cell coordinates and their A1-notation string form.
//!
//! Provides bidirectional conversion between spreadsheet-style cell
//! references (e.g. `"A1"`, `"B2"`, `"AA100"`) and `(row, col)` coordinates,
//! plus the grid bounds and the distinguished invalid position.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Maximum number of rows a sheet can address (exclusive upper bound).
pub const MAX_ROWS: i32 = 16384;
/// Maximum number of columns a sheet can address (exclusive upper bound).
pub const MAX_COLS: i32 = 16384;

/// Longest A1-notation string `ToString`/`FromString` will accept, e.g.
/// `"XFD16384"`.
const MAX_POSITION_LENGTH: usize = 17;

/// A cell coordinate: zero-based row and column, or the distinguished
/// [`Position::NONE`] sentinel.
///
/// `row`/`col` are signed so `NONE` (`(-1, -1)`) can be represented without
/// an `Option` wrapper at every call site — callers that only ever handle
/// validated positions can ignore the sentinel entirely.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// The distinguished invalid position.
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub fn new(row: i32, col: i32) -> Position {
        Position { row, col }
    }

    /// True iff this position falls within `[0, MAX_ROWS) x [0, MAX_COLS)`.
    pub fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0 && self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Render as A1 notation, or `""` for an invalid position.
    pub fn to_a1(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!("{}{}", col_to_letters(self.col), self.row + 1)
    }

    /// Parse an A1-notation string. Returns [`Position::NONE`] on any
    /// failure: wrong pattern, over-length input, or an in-pattern value
    /// that decodes outside the grid.
    pub fn from_a1(s: &str) -> Position {
        if s.len() > MAX_POSITION_LENGTH {
            return Position::NONE;
        }
        let Some((letters, digits)) = split_a1(s) else {
            return Position::NONE;
        };
        let Some(col) = letters_to_col(letters) else {
            return Position::NONE;
        };
        let Ok(row_one_based) = digits.parse::<i64>() else {
            return Position::NONE;
        };
        let row = row_one_based - 1;
        if row < 0 || row > i64::from(i32::MAX) || col > i64::from(i32::MAX) {
            return Position::NONE;
        }
        let pos = Position::new(row as i32, col as i32);
        if pos.is_valid() { pos } else { Position::NONE }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<digits>[1-9][0-9]*)$")
            .expect("A1 position regex must compile")
    })
}

/// Split `"AA100"` into `("AA", "100")` per the `[A-Z]+[1-9][0-9]*` grammar.
fn split_a1(s: &str) -> Option<(&str, &str)> {
    let caps = a1_re().captures(s)?;
    let letters = caps.name("letters")?.as_str();
    let digits = caps.name("digits")?.as_str();
    Some((letters, digits))
}

/// Bijective base-26 column decode: `A -> 0, Z -> 25, AA -> 26, AZ -> 51,
/// BA -> 52, ZZ -> 701, AAA -> 702`. Returns `None` on overflow.
fn letters_to_col(letters: &str) -> Option<i64> {
    let mut acc: i64 = 0;
    for b in letters.bytes() {
        let digit = i64::from(b - b'A') + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    acc.checked_sub(1)
}

/// Bijective base-26 column encode, the inverse of [`letters_to_col`].
fn col_to_letters(col: i32) -> String {
    let mut n = i64::from(col) + 1;
    let mut result = Vec::new();
    while n > 0 {
        n -= 1;
        result.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    result.reverse();
    String::from_utf8(result).expect("column letters are always ASCII")
}
