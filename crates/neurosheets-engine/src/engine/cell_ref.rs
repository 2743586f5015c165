//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates, plus
//! the rectangular [`CellRange`] used by range functions.
//!
//! # Examples
//!
//! ```
//! use neurosheets_engine::engine::CellRef;
//!
//! let cell = CellRef::from_str("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by column and row indices (0-indexed).
///
/// Ordering is row-major, which is also the order cells are written out in.
/// Serialized as its A1 string so a sheet maps cleanly onto a JSON object.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "b2", "AA10").
    /// Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        Self::parse_a1(name)
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let col = Self::letters_to_col(letters)?;
        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(col, row))
    }

    /// Convert column letters to a zero-based index ("A" -> 0, "AA" -> 26).
    /// Returns None for empty, non-alphabetic or overflowing input.
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut col_acc = 0usize;
        for c in letters.bytes() {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        col_acc.checked_sub(1)
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Move by a signed offset, returning None when the result leaves the sheet.
    pub fn offset(&self, delta_col: isize, delta_row: isize) -> Option<CellRef> {
        let col = self.col.checked_add_signed(delta_col)?;
        let row = self.row.checked_add_signed(delta_row)?;
        Some(CellRef::new(col, row))
    }
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("A1 reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl TryFrom<String> for CellRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellRef> for String {
    fn from(value: CellRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

/// An inclusive rectangle of cells.
///
/// Corners are normalized on construction, so `A3:A1` covers the same cells
/// as `A1:A3`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CellRange {
    start: CellRef,
    end: CellRef,
}

impl CellRange {
    pub fn new(a: CellRef, b: CellRef) -> CellRange {
        let start = CellRef::new(a.col.min(b.col), a.row.min(b.row));
        let end = CellRef::new(a.col.max(b.col), a.row.max(b.row));
        CellRange { start, end }
    }

    /// Parse a range like "A1:B5".
    pub fn parse(range: &str) -> Option<CellRange> {
        let (start, end) = range.split_once(':')?;
        let start = CellRef::from_str(start.trim())?;
        let end = CellRef::from_str(end.trim())?;
        Some(CellRange::new(start, end))
    }

    /// Top-left corner.
    pub fn start(&self) -> &CellRef {
        &self.start
    }

    /// Bottom-right corner.
    pub fn end(&self) -> &CellRef {
        &self.end
    }

    pub fn rows(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    /// Number of cells covered, or None if it does not fit in a usize.
    pub fn cell_count(&self) -> Option<usize> {
        self.rows().checked_mul(self.cols())
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// Iterate the covered cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellRef::new(col, row))
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
