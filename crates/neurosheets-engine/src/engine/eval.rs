//! Formula evaluation against a read-only view of the sheet.
//!
//! [`Evaluator`] walks a parsed [`Expr`], resolving references through a
//! [`CellSource`]. Referenced formula cells are evaluated recursively and
//! memoized, and a stack of in-progress cells catches circular references.
//!
//! Two entry points exist:
//! - [`try_evaluate_formula`] / [`Evaluator`] return a `Result` with a
//!   distinguishable [`EvalError`];
//! - [`evaluate_formula`] never fails and yields 0 for any error.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::ast::{Arg, BinaryOp, Expr, Function, UnaryOp};
use super::cell::Cell;
use super::cell_ref::CellRef;
use super::functions::Accumulator;
use super::parser::{ParseError, parse_formula};

/// Largest range a function may walk.
pub const MAX_RANGE_CELLS: usize = 1_000_000;

/// Deepest chain of formula cells referencing formula cells.
pub const MAX_CHAIN_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("result is not a finite number")]
    NonFinite,
    #[error("range {0} covers too many cells")]
    RangeTooLarge(String),
    #[error("formula chain nested too deeply")]
    DepthExceeded,
    #[error("circular reference")]
    Circular,
}

impl EvalError {
    /// Errors that say something about the cells a formula reads, rather than
    /// about the formula itself. These pass through references instead of
    /// being read as zero.
    fn propagates(&self) -> bool {
        matches!(self, EvalError::Circular | EvalError::DepthExceeded)
    }
}

pub type EvalResult = Result<f64, EvalError>;

/// Read-only access to cells by address.
pub trait CellSource {
    fn cell(&self, at: &CellRef) -> Option<&Cell>;
}

impl CellSource for BTreeMap<CellRef, Cell> {
    fn cell(&self, at: &CellRef) -> Option<&Cell> {
        self.get(at)
    }
}

impl CellSource for HashMap<CellRef, Cell> {
    fn cell(&self, at: &CellRef) -> Option<&Cell> {
        self.get(at)
    }
}

/// Evaluate a formula, falling back to 0 on any failure.
///
/// The result is always finite.
pub fn evaluate_formula<S: CellSource + ?Sized>(formula: &str, source: &S) -> f64 {
    try_evaluate_formula(formula, source).unwrap_or(0.0)
}

/// Evaluate a formula, reporting why it failed.
pub fn try_evaluate_formula<S: CellSource + ?Sized>(formula: &str, source: &S) -> EvalResult {
    Evaluator::new(source).eval_formula(formula)
}

pub struct Evaluator<'a, S: CellSource + ?Sized> {
    source: &'a S,
    memo: HashMap<CellRef, EvalResult>,
    in_progress: Vec<CellRef>,
}

impl<'a, S: CellSource + ?Sized> Evaluator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::with_memo(source, HashMap::new())
    }

    /// Start from results computed earlier against the same cells.
    pub fn with_memo(source: &'a S, memo: HashMap<CellRef, EvalResult>) -> Self {
        Evaluator {
            source,
            memo,
            in_progress: Vec::new(),
        }
    }

    /// Hand back the memoized formula results.
    pub fn into_memo(self) -> HashMap<CellRef, EvalResult> {
        self.memo
    }

    /// Evaluate formula text that does not live in any cell.
    pub fn eval_formula(&mut self, formula: &str) -> EvalResult {
        let expr = parse_formula(formula)?;
        self.eval_expr(&expr).and_then(finite)
    }

    /// Evaluate formula text as though it were stored at `at`, so that
    /// references back to `at` are reported as circular.
    pub fn eval_formula_at(&mut self, at: &CellRef, formula: &str) -> EvalResult {
        if self.in_progress.contains(at) {
            return Err(EvalError::Circular);
        }
        if self.in_progress.len() >= MAX_CHAIN_DEPTH {
            return Err(EvalError::DepthExceeded);
        }
        let expr = parse_formula(formula)?;
        self.in_progress.push(at.clone());
        let result = self.eval_expr(&expr);
        self.in_progress.pop();
        result.and_then(finite)
    }

    /// Numeric value of a cell: the evaluated result for formula cells, the
    /// coerced value otherwise (0 when empty or not numeric).
    pub fn eval_cell(&mut self, at: &CellRef) -> EvalResult {
        if self.in_progress.contains(at) {
            return Err(EvalError::Circular);
        }
        if let Some(result) = self.memo.get(at) {
            return result.clone();
        }
        let source = self.source;
        let Some(cell) = source.cell(at) else {
            return Ok(0.0);
        };
        let Some(formula) = &cell.formula else {
            return Ok(cell.value.as_number().unwrap_or(0.0));
        };

        let result = self.eval_formula_at(at, formula);
        // Depth failures depend on where evaluation started, so they are not
        // a property of the cell.
        if result != Err(EvalError::DepthExceeded) {
            self.memo.insert(at.clone(), result.clone());
        }
        result
    }

    /// Value of a referenced cell as seen by another formula. `None` means the
    /// cell holds nothing numeric. A referenced formula that failed on its own
    /// terms reads as 0.
    fn referenced_value(&mut self, at: &CellRef) -> Result<Option<f64>, EvalError> {
        let source = self.source;
        let Some(cell) = source.cell(at) else {
            return Ok(None);
        };
        if cell.formula.is_none() {
            return Ok(cell.value.as_number());
        }
        match self.eval_cell(at) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.propagates() => Err(e),
            Err(_) => Ok(Some(0.0)),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Ref(cell) => Ok(self.referenced_value(cell)?.unwrap_or(0.0)),
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                Ok(match op {
                    UnaryOp::Plus => value,
                    UnaryOp::Minus => -value,
                })
            }
            Expr::Binary { first, rest } => {
                let mut acc = self.eval_expr(first)?;
                for (op, operand) in rest {
                    let rhs = self.eval_expr(operand)?;
                    acc = match op {
                        BinaryOp::Add => acc + rhs,
                        BinaryOp::Sub => acc - rhs,
                        BinaryOp::Mul => acc * rhs,
                        BinaryOp::Div => acc / rhs,
                    };
                }
                Ok(acc)
            }
            Expr::Call { function, args } => self.call(*function, args),
        }
    }

    fn call(&mut self, function: Function, args: &[Arg]) -> EvalResult {
        let mut acc = Accumulator::default();
        for arg in args {
            match arg {
                Arg::Range(range) => {
                    if range.cell_count().is_none_or(|n| n > MAX_RANGE_CELLS) {
                        return Err(EvalError::RangeTooLarge(range.to_string()));
                    }
                    for at in range.iter() {
                        self.accumulate_cell(&at, &mut acc)?;
                    }
                }
                Arg::Expr(expr) => {
                    let value = self.eval_expr(expr)?;
                    acc.push_number(value);
                }
            }
        }
        Ok(acc.finish(function))
    }

    fn accumulate_cell(&mut self, at: &CellRef, acc: &mut Accumulator) -> Result<(), EvalError> {
        let source = self.source;
        let Some(cell) = source.cell(at) else {
            return Ok(());
        };
        if cell.is_blank() {
            return Ok(());
        }
        match self.referenced_value(at)? {
            Some(n) => acc.push_number(n),
            None => acc.push_text(),
        }
        Ok(())
    }
}

fn finite(n: f64) -> EvalResult {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(EvalError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(entries: &[(&str, Cell)]) -> BTreeMap<CellRef, Cell> {
        entries
            .iter()
            .map(|(name, cell)| (CellRef::from_str(name).unwrap(), cell.clone()))
            .collect()
    }

    #[test]
    fn test_arithmetic_with_references() {
        let cells = sheet(&[("A1", Cell::new_number(10.0)), ("A2", Cell::new_number(4.0))]);
        assert_eq!(evaluate_formula("=A1*2 - A2/4", &cells), 19.0);
        assert_eq!(evaluate_formula("=-(A1+A2)", &cells), -14.0);
    }

    #[test]
    fn test_division_by_zero() {
        let cells = BTreeMap::new();
        assert_eq!(try_evaluate_formula("=1/0", &cells), Err(EvalError::NonFinite));
        assert_eq!(try_evaluate_formula("=0/0", &cells), Err(EvalError::NonFinite));
        assert_eq!(evaluate_formula("=1/0", &cells), 0.0);
    }

    #[test]
    fn test_formula_cells_are_evaluated_not_read_from_cache() {
        let mut stale = Cell::new_formula("=A1+1");
        stale.value = crate::engine::CellValue::Number(999.0);
        let cells = sheet(&[("A1", Cell::new_number(1.0)), ("B1", stale)]);
        assert_eq!(evaluate_formula("=B1*10", &cells), 20.0);
    }

    #[test]
    fn test_self_reference_is_circular() {
        let cells = sheet(&[("A1", Cell::new_formula("=A1+1"))]);
        let mut evaluator = Evaluator::new(&cells);
        assert_eq!(
            evaluator.eval_cell(&CellRef::new(0, 0)),
            Err(EvalError::Circular)
        );
    }

    #[test]
    fn test_mutual_reference_marks_every_member() {
        let cells = sheet(&[
            ("A1", Cell::new_formula("=B1")),
            ("B1", Cell::new_formula("=A1")),
            ("C1", Cell::new_formula("=5")),
        ]);
        let mut evaluator = Evaluator::new(&cells);
        assert_eq!(evaluator.eval_cell(&CellRef::new(0, 0)), Err(EvalError::Circular));
        assert_eq!(evaluator.eval_cell(&CellRef::new(1, 0)), Err(EvalError::Circular));
        assert_eq!(evaluator.eval_cell(&CellRef::new(2, 0)), Ok(5.0));
    }

    #[test]
    fn test_pending_formula_sees_its_own_address_as_circular() {
        let cells = sheet(&[
            ("A1", Cell::new_number(5.0)),
            ("B1", Cell::new_formula("=A1+1")),
        ]);
        let mut evaluator = Evaluator::new(&cells);
        // Writing "=B1*2" into A1 closes the loop even though A1 is still a literal.
        assert_eq!(
            evaluator.eval_formula_at(&CellRef::new(0, 0), "=B1*2"),
            Err(EvalError::Circular)
        );
    }

    #[test]
    fn test_broken_referenced_formula_reads_as_zero() {
        let cells = sheet(&[
            ("A1", Cell::new_formula("=1+")),
            ("A2", Cell::new_number(3.0)),
        ]);
        assert_eq!(evaluate_formula("=A1+A2", &cells), 3.0);
        assert_eq!(evaluate_formula("=COUNT(A1:A2)", &cells), 2.0);
    }

    #[test]
    fn test_huge_range_is_rejected() {
        let cells = BTreeMap::new();
        assert!(matches!(
            try_evaluate_formula("=SUM(A1:ZZ100000)", &cells),
            Err(EvalError::RangeTooLarge(_))
        ));
    }

    #[test]
    fn test_long_chain_hits_depth_limit() {
        let mut cells = BTreeMap::new();
        cells.insert(CellRef::new(0, 0), Cell::new_number(1.0));
        for row in 1..=(MAX_CHAIN_DEPTH + 10) {
            cells.insert(
                CellRef::new(0, row),
                Cell::new_formula(&format!("=A{}+1", row)),
            );
        }
        let last = CellRef::new(0, MAX_CHAIN_DEPTH + 10);
        let mut evaluator = Evaluator::new(&cells);
        assert_eq!(evaluator.eval_cell(&last), Err(EvalError::DepthExceeded));

        // Evaluating bottom-up keeps every step shallow.
        let mut evaluator = Evaluator::new(&cells);
        for row in 1..=(MAX_CHAIN_DEPTH + 10) {
            evaluator.eval_cell(&CellRef::new(0, row)).unwrap();
        }
        assert_eq!(evaluator.eval_cell(&last), Ok((MAX_CHAIN_DEPTH + 11) as f64));
    }
}
