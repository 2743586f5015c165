//! Dependency extraction and the sheet-wide dependency graph.
//!
//! Formula text is parsed to find every cell it reads (single references and
//! each cell of a range). The graph keeps both directions: which cells a
//! formula reads (precedents) and which formulas read a cell (dependents).
//! Dependents drive cache invalidation; precedents drive cycle detection and
//! the recalculation order.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use super::ast::Reference;
use super::cell::Cell;
use super::cell_ref::CellRef;
use super::eval::MAX_RANGE_CELLS;
use super::parser::parse_formula;

/// Extract every cell a formula reads, in source order without duplicates.
///
/// Formulas that do not parse read nothing. Ranges larger than the
/// evaluator's range limit are skipped, since they can never be evaluated.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    let Ok(expr) = parse_formula(formula) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut deps = Vec::new();
    for reference in expr.references() {
        match reference {
            Reference::Cell(cell) => {
                if seen.insert(cell.clone()) {
                    deps.push(cell);
                }
            }
            Reference::Range(range) => {
                if range.cell_count().is_none_or(|n| n > MAX_RANGE_CELLS) {
                    continue;
                }
                for cell in range.iter() {
                    if seen.insert(cell.clone()) {
                        deps.push(cell);
                    }
                }
            }
        }
    }
    deps
}

/// Formula cells split into a safe evaluation order and the cells that sit
/// on, or downstream of, a cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationOrder {
    pub ordered: Vec<CellRef>,
    pub cyclic: Vec<CellRef>,
}

#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    precedents: BTreeMap<CellRef, Vec<CellRef>>,
    dependents: BTreeMap<CellRef, BTreeSet<CellRef>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every formula cell in a sheet.
    pub fn build<'a>(cells: impl IntoIterator<Item = (&'a CellRef, &'a Cell)>) -> Self {
        let mut graph = Self::new();
        for (at, cell) in cells {
            if let Some(formula) = &cell.formula {
                graph.set_formula(at, Some(formula));
            }
        }
        graph
    }

    /// Replace the edges leaving `cell`. `None` means the cell no longer
    /// holds a formula.
    pub fn set_formula(&mut self, cell: &CellRef, formula: Option<&str>) {
        if let Some(old) = self.precedents.remove(cell) {
            for dep in old {
                if let Some(set) = self.dependents.get_mut(&dep) {
                    set.remove(cell);
                    if set.is_empty() {
                        self.dependents.remove(&dep);
                    }
                }
            }
        }

        let Some(formula) = formula else {
            return;
        };
        let deps = extract_dependencies(formula);
        for dep in &deps {
            self.dependents
                .entry(dep.clone())
                .or_default()
                .insert(cell.clone());
        }
        self.precedents.insert(cell.clone(), deps);
    }

    pub fn clear(&mut self) {
        self.precedents.clear();
        self.dependents.clear();
    }

    /// Cells the formula at `cell` reads.
    pub fn precedents(&self, cell: &CellRef) -> &[CellRef] {
        self.precedents.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Formula cells that read `cell` directly.
    pub fn dependents(&self, cell: &CellRef) -> impl Iterator<Item = &CellRef> {
        self.dependents.get(cell).into_iter().flatten()
    }

    pub fn is_formula(&self, cell: &CellRef) -> bool {
        self.precedents.contains_key(cell)
    }

    pub fn formula_cells(&self) -> impl Iterator<Item = &CellRef> {
        self.precedents.keys()
    }

    /// Every formula cell that reads `cell`, directly or through other
    /// formulas. `cell` itself is included only if it reads itself.
    pub fn transitive_dependents(&self, cell: &CellRef) -> HashSet<CellRef> {
        let mut out = HashSet::new();
        let mut to_process = vec![cell.clone()];
        while let Some(current) = to_process.pop() {
            for dep in self.dependents(&current) {
                if out.insert(dep.clone()) {
                    to_process.push(dep.clone());
                }
            }
        }
        out
    }

    /// Order formula cells so every formula comes after the formulas it
    /// reads (Kahn's algorithm). Whatever cannot be ordered is cyclic.
    pub fn evaluation_order(&self) -> EvaluationOrder {
        let mut pending: BTreeMap<&CellRef, usize> = BTreeMap::new();
        for (cell, deps) in &self.precedents {
            let formula_deps = deps.iter().filter(|d| self.is_formula(d)).count();
            pending.insert(cell, formula_deps);
        }

        let mut ready: VecDeque<&CellRef> = pending
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(cell, _)| *cell)
            .collect();
        let mut ordered = Vec::with_capacity(pending.len());

        while let Some(cell) = ready.pop_front() {
            ordered.push(cell.clone());
            for dependent in self.dependents(cell) {
                if let Some(n) = pending.get_mut(dependent) {
                    *n -= 1;
                    if *n == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        let done: HashSet<&CellRef> = ordered.iter().collect();
        let cyclic = pending
            .keys()
            .filter(|cell| !done.contains(*cell))
            .map(|cell| (*cell).clone())
            .collect();

        EvaluationOrder { ordered, cyclic }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    #[test]
    fn test_extract_dependencies_expands_ranges() {
        let deps = extract_dependencies("=A1 + SUM(B1:C2) + A1");
        assert_eq!(
            deps,
            vec![r("A1"), r("B1"), r("C1"), r("B2"), r("C2")]
        );
    }

    #[test]
    fn test_extract_dependencies_skips_over_limit_ranges() {
        let deps = extract_dependencies("=SUM(A1:A1000001)+B2");
        assert_eq!(deps, vec![r("B2")]);
    }

    #[test]
    fn test_unparseable_formula_has_no_dependencies() {
        assert!(extract_dependencies("=A1+").is_empty());
    }

    #[test]
    fn test_set_formula_replaces_edges() {
        let mut graph = DependencyGraph::new();
        graph.set_formula(&r("C1"), Some("=A1+B1"));
        assert_eq!(graph.dependents(&r("A1")).count(), 1);

        graph.set_formula(&r("C1"), Some("=B1"));
        assert_eq!(graph.dependents(&r("A1")).count(), 0);
        assert_eq!(graph.precedents(&r("C1")), &[r("B1")]);

        graph.set_formula(&r("C1"), None);
        assert!(!graph.is_formula(&r("C1")));
        assert_eq!(graph.dependents(&r("B1")).count(), 0);
    }

    #[test]
    fn test_transitive_dependents() {
        let mut graph = DependencyGraph::new();
        graph.set_formula(&r("B1"), Some("=A1"));
        graph.set_formula(&r("C1"), Some("=B1*2"));
        graph.set_formula(&r("D1"), Some("=SUM(C1:C3)"));
        graph.set_formula(&r("E1"), Some("=7"));

        let deps = graph.transitive_dependents(&r("A1"));
        assert_eq!(deps.len(), 3);
        assert!(deps.contains(&r("D1")));
        assert!(!deps.contains(&r("E1")));
    }

    #[test]
    fn test_evaluation_order_puts_precedents_first() {
        let mut graph = DependencyGraph::new();
        graph.set_formula(&r("A3"), Some("=A2+1"));
        graph.set_formula(&r("A2"), Some("=A1+1"));
        graph.set_formula(&r("A1"), Some("=1"));

        let order = graph.evaluation_order();
        assert_eq!(order.ordered, vec![r("A1"), r("A2"), r("A3")]);
        assert!(order.cyclic.is_empty());
    }

    #[test]
    fn test_evaluation_order_reports_cycles_and_downstream() {
        let mut graph = DependencyGraph::new();
        graph.set_formula(&r("A1"), Some("=B1"));
        graph.set_formula(&r("B1"), Some("=A1"));
        graph.set_formula(&r("C1"), Some("=A1+1"));
        graph.set_formula(&r("D1"), Some("=5"));

        let order = graph.evaluation_order();
        assert_eq!(order.ordered, vec![r("D1")]);
        assert_eq!(order.cyclic, vec![r("A1"), r("B1"), r("C1")]);
    }
}
