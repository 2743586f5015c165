//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Cell`], [`CellValue`], [`CellStyle`] - Data structures for cell storage
//! - [`CellStore`] - Sparse cell map with eager formula evaluation on write
//! - [`CellRef`], [`CellRange`] - A1 notation parsing and rectangles
//! - [`parse_formula`] - Formula text to [`Expr`]
//! - [`Evaluator`], [`evaluate_formula`] - Formula evaluation
//! - [`DependencyGraph`], [`detect_cycle`] - Dependency tracking and cycles
//! - [`format_result`], [`format_value`] - Format values for display

mod ast;
mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod format;
mod functions;
mod lexer;
mod parser;
mod store;

pub use ast::{Arg, BinaryOp, Expr, FUNCTIONS, Function, FunctionInfo, Reference, UnaryOp};
pub use cell::{Align, Cell, CellStyle, CellValue, NumberFormat, parse_number};
pub use cell_ref::{CellRange, CellRef};
pub use cycle::detect_cycle;
pub use deps::{DependencyGraph, EvaluationOrder, extract_dependencies};
pub use eval::{
    CellSource, EvalError, EvalResult, Evaluator, MAX_CHAIN_DEPTH, MAX_RANGE_CELLS,
    evaluate_formula, try_evaluate_formula,
};
pub use format::{CIRCULAR_DISPLAY, format_number, format_result, format_value, format_with};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{ParseError, ParseResult, parse_formula};
pub use store::CellStore;
