use chrono::{DateTime, Utc};
use neurosheets_engine::engine::{CellRef, CellStore, DependencyGraph, EvalResult};
use std::collections::HashMap;

use crate::storage::SheetFile;

/// Title given to new sheets.
pub const DEFAULT_TITLE: &str = "Book1";

/// Default size of the editable grid (A-Z, 100 rows). CSV import is clipped
/// to it.
pub const GRID_COLS: usize = 26;
pub const GRID_ROWS: usize = 100;

/// Default export window (A1:T50).
pub const EXPORT_COLS: usize = 20;
pub const EXPORT_ROWS: usize = 50;

/// UI-agnostic document state for a single sheet.
#[derive(Debug)]
pub struct Document {
    pub title: String,
    /// The cells, with formula values cached as of their last evaluation
    pub cells: CellStore,
    /// Formula dependencies in both directions
    pub graph: DependencyGraph,
    /// Memoized results for formula cells; entries are dropped when a
    /// precedent changes
    pub(crate) results: HashMap<CellRef, EvalResult>,
    /// Whether the sheet has changed since it was loaded or saved
    pub modified: bool,
    /// When the sheet was last saved, if ever
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create an empty document.
    ///
    /// This constructor is side-effect free: it does not touch storage.
    pub fn new() -> Self {
        Self::with_title(DEFAULT_TITLE)
    }

    pub fn with_title(title: &str) -> Self {
        Document {
            title: title.to_string(),
            cells: CellStore::new(),
            graph: DependencyGraph::new(),
            results: HashMap::new(),
            modified: false,
            updated_at: None,
        }
    }

    /// Build a document from a persisted sheet, re-evaluating every formula.
    pub fn from_sheet(sheet: SheetFile) -> Self {
        let mut doc = Document {
            title: sheet.title,
            cells: sheet.data,
            graph: DependencyGraph::new(),
            results: HashMap::new(),
            modified: false,
            updated_at: Some(sheet.updated_at),
        };
        doc.rebuild_graph();
        doc.evaluate_all_cells();
        doc
    }

    /// Rebuild the dependency graph from the cells and drop every cached
    /// result. Call this after cells are replaced wholesale.
    pub(crate) fn rebuild_graph(&mut self) {
        self.graph = DependencyGraph::build(self.cells.iter());
        self.results.clear();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
