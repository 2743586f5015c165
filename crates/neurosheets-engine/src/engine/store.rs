//! The cell store: a sparse map from address to [`Cell`].
//!
//! Writes classify their input (formula / number / text / empty) and
//! evaluate formulas eagerly, so a freshly written formula cell always holds
//! a current numeric value. Absent addresses read as empty cells.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellStyle, CellValue};
use super::cell_ref::{CellRange, CellRef};
use super::eval::{CellSource, Evaluator};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellStore {
    cells: BTreeMap<CellRef, Cell>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a cell; absent addresses yield an empty cell.
    pub fn read(&self, at: &CellRef) -> Cell {
        self.cells.get(at).cloned().unwrap_or_default()
    }

    pub fn get(&self, at: &CellRef) -> Option<&Cell> {
        self.cells.get(at)
    }

    /// Store user input at `at`.
    ///
    /// Input starting with '=' is kept as the formula and evaluated right
    /// away; a failed evaluation stores 0. Anything else is classified as a
    /// literal. The cell's style survives the write.
    pub fn write(&mut self, at: &CellRef, input: &str) -> &Cell {
        let style = self.cells.get(at).and_then(|c| c.style.clone());

        let cell = if input.starts_with('=') {
            let value = Evaluator::new(&*self)
                .eval_formula_at(at, input)
                .unwrap_or(0.0);
            Cell {
                value: CellValue::Number(value),
                formula: Some(input.to_string()),
                style,
            }
        } else {
            Cell {
                value: Cell::literal_value(input),
                formula: None,
                style,
            }
        };

        self.cells.insert(at.clone(), cell);
        &self.cells[at]
    }

    /// Put a cell in place as-is, with no evaluation.
    pub fn insert(&mut self, at: CellRef, cell: Cell) {
        self.cells.insert(at, cell);
    }

    pub fn remove(&mut self, at: &CellRef) -> Option<Cell> {
        self.cells.remove(at)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Edit the style of a cell, creating the cell and its style as needed.
    pub fn update_style(&mut self, at: &CellRef, edit: impl FnOnce(&mut CellStyle)) {
        let cell = self.cells.entry(at.clone()).or_default();
        edit(cell.style.get_or_insert_with(CellStyle::default));
    }

    /// Overwrite the stored value of a formula cell after recalculation.
    pub fn set_cached_value(&mut self, at: &CellRef, value: f64) {
        if let Some(cell) = self.cells.get_mut(at)
            && cell.formula.is_some()
        {
            cell.value = CellValue::Number(value);
        }
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Smallest range starting at A1 that covers every non-blank cell.
    pub fn bounds(&self) -> Option<CellRange> {
        let mut max_row = None;
        let mut max_col = None;
        for (at, cell) in &self.cells {
            if cell.is_blank() {
                continue;
            }
            max_row = max_row.max(Some(at.row));
            max_col = max_col.max(Some(at.col));
        }
        Some(CellRange::new(
            CellRef::new(0, 0),
            CellRef::new(max_col?, max_row?),
        ))
    }
}

impl CellSource for CellStore {
    fn cell(&self, at: &CellRef) -> Option<&Cell> {
        self.cells.get(at)
    }
}

impl FromIterator<(CellRef, Cell)> for CellStore {
    fn from_iter<I: IntoIterator<Item = (CellRef, Cell)>>(iter: I) -> Self {
        CellStore {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cell::Align;

    fn r(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    #[test]
    fn test_write_classifies_input() {
        let mut store = CellStore::new();
        assert_eq!(store.write(&r("A1"), "42").value, CellValue::Number(42.0));
        assert_eq!(
            store.write(&r("A2"), "hello").value,
            CellValue::Text("hello".to_string())
        );
        assert_eq!(store.write(&r("A3"), "").value, CellValue::Empty);
        assert_eq!(store.len(), 3);
        assert_eq!(store.read(&r("Z99")), Cell::new_empty());
    }

    #[test]
    fn test_write_evaluates_formula() {
        let mut store = CellStore::new();
        store.write(&r("A1"), "10");
        store.write(&r("A2"), "20");
        let cell = store.write(&r("A3"), "=SUM(A1:A2)").clone();
        assert_eq!(cell.value, CellValue::Number(30.0));
        assert_eq!(cell.formula.as_deref(), Some("=SUM(A1:A2)"));
    }

    #[test]
    fn test_write_stores_zero_for_failures() {
        let mut store = CellStore::new();
        assert_eq!(store.write(&r("A1"), "=1/0").value, CellValue::Number(0.0));
        assert_eq!(store.write(&r("A2"), "=A2+1").value, CellValue::Number(0.0));
        assert_eq!(store.write(&r("A3"), "=FOO(1)").value, CellValue::Number(0.0));
        assert_eq!(
            store.read(&r("A3")).formula.as_deref(),
            Some("=FOO(1)")
        );
    }

    #[test]
    fn test_write_keeps_style() {
        let mut store = CellStore::new();
        store.update_style(&r("B2"), |s| s.bold = Some(true));
        store.write(&r("B2"), "5");
        store.write(&r("B2"), "");
        let cell = store.read(&r("B2"));
        assert_eq!(cell.value, CellValue::Empty);
        assert!(cell.style.unwrap().is_bold());
    }

    #[test]
    fn test_update_style_creates_cell() {
        let mut store = CellStore::new();
        store.update_style(&r("C3"), |s| s.align = Some(Align::Right));
        let cell = store.read(&r("C3"));
        assert!(cell.is_blank());
        assert_eq!(cell.style.unwrap().align, Some(Align::Right));
    }

    #[test]
    fn test_bounds_ignores_blank_cells() {
        let mut store = CellStore::new();
        assert_eq!(store.bounds(), None);
        store.write(&r("C2"), "1");
        store.write(&r("A5"), "x");
        store.update_style(&r("H20"), |s| s.italic = Some(true));
        assert_eq!(store.bounds().unwrap().to_string(), "A1:C5");
    }

    #[test]
    fn test_json_shape() {
        let mut store = CellStore::new();
        store.write(&r("A1"), "10");
        store.write(&r("B1"), "=A1*2");
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["A1"]["value"], 10.0);
        assert_eq!(json["B1"]["value"], 20.0);
        assert_eq!(json["B1"]["formula"], "=A1*2");
        assert!(json["A1"].get("formula").is_none());

        let back: CellStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }
}
