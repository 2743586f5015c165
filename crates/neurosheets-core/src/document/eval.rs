use super::Document;
use neurosheets_engine::engine::{
    CellRange, CellRef, CellStore, EvalError, EvalResult, Evaluator, format_result, format_value,
};
use tracing::debug;

impl Document {
    /// Evaluate the formula at `cell_ref`, reusing cached results.
    /// Returns None when the cell does not hold a formula.
    pub fn cell_result(&mut self, cell_ref: &CellRef) -> Option<EvalResult> {
        if !self.cells.get(cell_ref)?.is_formula() {
            return None;
        }
        if let Some(result) = self.results.get(cell_ref) {
            return Some(result.clone());
        }

        let mut result = self.eval_with_cache(|ev| ev.eval_cell(cell_ref));
        if result == Err(EvalError::DepthExceeded) {
            // A long chain of formulas: evaluate bottom-up so no single step
            // recurses deeply, then read the result from the cache.
            self.evaluate_all_cells();
            result = self
                .results
                .get(cell_ref)
                .cloned()
                .unwrap_or(Err(EvalError::DepthExceeded));
        }
        Some(result)
    }

    /// Get the display value for a cell
    pub fn get_cell_display(&mut self, cell_ref: &CellRef) -> String {
        let Some(cell) = self.cells.get(cell_ref) else {
            return String::new();
        };
        let format = cell.format();
        if !cell.is_formula() {
            return format_value(&cell.value, format);
        }

        match self.cell_result(cell_ref) {
            Some(result) => format_result(&result, format),
            None => String::new(),
        }
    }

    /// Evaluate formula text against the sheet without storing it.
    pub fn evaluate(&mut self, formula: &str) -> EvalResult {
        self.eval_with_cache(|ev| ev.eval_formula(formula))
    }

    /// Evaluate every formula cell in dependency order, refresh the values
    /// stored in the cells and keep all results cached.
    pub fn evaluate_all_cells(&mut self) {
        let order = self.graph.evaluation_order();
        debug!(
            ordered = order.ordered.len(),
            cyclic = order.cyclic.len(),
            "recalculating"
        );

        let results: Vec<(CellRef, EvalResult)> = self.eval_with_cache(|ev| {
            order
                .ordered
                .iter()
                .chain(&order.cyclic)
                .map(|cell_ref| (cell_ref.clone(), ev.eval_cell(cell_ref)))
                .collect()
        });

        for (cell_ref, result) in results {
            self.cells
                .set_cached_value(&cell_ref, result.clone().unwrap_or(0.0));
            if result != Err(EvalError::DepthExceeded) {
                self.results.insert(cell_ref, result);
            }
        }
    }

    /// Display strings for every cell of a range, row by row.
    pub fn display_rows(&mut self, range: &CellRange) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(range.rows());
        for row in range.start().row..=range.end().row {
            let mut line = Vec::with_capacity(range.cols());
            for col in range.start().col..=range.end().col {
                line.push(self.get_cell_display(&CellRef::new(col, row)));
            }
            rows.push(line);
        }
        rows
    }

    /// Run an evaluator over the cells with the cached results as its memo,
    /// then keep whatever it computed.
    fn eval_with_cache<T>(
        &mut self,
        run: impl FnOnce(&mut Evaluator<'_, CellStore>) -> T,
    ) -> T {
        let memo = std::mem::take(&mut self.results);
        let mut evaluator = Evaluator::with_memo(&self.cells, memo);
        let out = run(&mut evaluator);
        self.results = evaluator.into_memo();
        out
    }
}
