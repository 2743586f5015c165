//! Circular dependency detection for formula cells.
//!
//! When a formula is entered we check whether it closes a loop
//! (A1 reads B1, B1 reads C1, C1 reads A1) so the editor can say so.
//! Evaluation catches cycles on its own; this search only exists to name
//! the cells involved.

use std::collections::HashSet;

use super::cell_ref::CellRef;
use super::deps::DependencyGraph;

/// Detect a circular dependency reachable from `start`.
///
/// Returns the loop as a closed path (`[A1, B1, A1]`), or `None`.
pub fn detect_cycle(start: &CellRef, graph: &DependencyGraph) -> Option<Vec<CellRef>> {
    let mut visiting = HashSet::new();
    let mut finished = HashSet::new();
    let mut path = Vec::new();

    if detect_cycle_dfs(start, graph, &mut visiting, &mut finished, &mut path) {
        // Drop the lead-in from `start` to where the loop begins.
        let repeated = path.last()?;
        let begin = path.iter().position(|c| c == repeated)?;
        Some(path.split_off(begin))
    } else {
        None
    }
}

fn detect_cycle_dfs(
    current: &CellRef,
    graph: &DependencyGraph,
    visiting: &mut HashSet<CellRef>,
    finished: &mut HashSet<CellRef>,
    path: &mut Vec<CellRef>,
) -> bool {
    if visiting.contains(current) {
        path.push(current.clone());
        return true;
    }
    if finished.contains(current) || !graph.is_formula(current) {
        return false;
    }

    visiting.insert(current.clone());
    path.push(current.clone());

    for dep in graph.precedents(current) {
        if detect_cycle_dfs(dep, graph, visiting, finished, path) {
            return true;
        }
    }

    path.pop();
    visiting.remove(current);
    finished.insert(current.clone());
    false
}
