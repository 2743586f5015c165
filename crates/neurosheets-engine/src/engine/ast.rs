//! Syntax tree for parsed formulas.

use std::fmt;

use super::cell_ref::{CellRef, CellRange};

/// Built-in range functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Sum,
    Average,
    Count,
    Max,
    Min,
}

pub struct FunctionInfo {
    pub function: Function,
    pub name: &'static str,
    pub description: &'static str,
}

/// Function metadata, used for name lookup and help text.
pub const FUNCTIONS: &[FunctionInfo] = &[
    FunctionInfo {
        function: Function::Sum,
        name: "SUM",
        description: "Sum of numeric values",
    },
    FunctionInfo {
        function: Function::Average,
        name: "AVERAGE",
        description: "Average of numeric values (0 when there are none)",
    },
    FunctionInfo {
        function: Function::Count,
        name: "COUNT",
        description: "Count of non-empty cells",
    },
    FunctionInfo {
        function: Function::Max,
        name: "MAX",
        description: "Largest numeric value (0 when there are none)",
    },
    FunctionInfo {
        function: Function::Min,
        name: "MIN",
        description: "Smallest numeric value (0 when there are none)",
    },
];

impl Function {
    /// Look up a function by its (upper-case) spreadsheet name.
    pub fn from_name(name: &str) -> Option<Function> {
        FUNCTIONS
            .iter()
            .find(|info| info.name.eq_ignore_ascii_case(name))
            .map(|info| info.function)
    }

    pub fn name(self) -> &'static str {
        FUNCTIONS
            .iter()
            .find(|info| info.function == self)
            .map(|info| info.name)
            .unwrap_or("?")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(CellRef),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// A run of same-precedence operators, applied left to right:
    /// `first op1 e1 op2 e2 ...`. Kept flat so long sums never nest.
    Binary {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
    Call {
        function: Function,
        args: Vec<Arg>,
    },
}

/// A function argument: a rectangle of cells or a single expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Range(CellRange),
    Expr(Expr),
}

/// What an expression reads from the sheet.
#[derive(Clone, Debug, PartialEq)]
pub enum Reference {
    Cell(CellRef),
    Range(CellRange),
}

impl Expr {
    /// Join operands into one left-to-right run. A lone operand stays as is.
    pub fn binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
        if rest.is_empty() {
            first
        } else {
            Expr::Binary {
                first: Box::new(first),
                rest,
            }
        }
    }

    /// Collect every cell and range this expression reads, in source order.
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<Reference>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ref(cell) => out.push(Reference::Cell(cell.clone())),
            Expr::Unary { operand, .. } => operand.collect_references(out),
            Expr::Binary { first, rest } => {
                first.collect_references(out);
                for (_, operand) in rest {
                    operand.collect_references(out);
                }
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    match arg {
                        Arg::Range(range) => out.push(Reference::Range(range.clone())),
                        Arg::Expr(expr) => expr.collect_references(out),
                    }
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Ref(cell) => write!(f, "{}", cell),
            Expr::Unary { op, operand } => {
                let sign = match op {
                    UnaryOp::Plus => '+',
                    UnaryOp::Minus => '-',
                };
                write!(f, "{}{}", sign, operand)
            }
            Expr::Binary { first, rest } => {
                for _ in rest {
                    write!(f, "(")?;
                }
                write!(f, "{}", first)?;
                for (op, operand) in rest {
                    write!(f, " {} {})", op.symbol(), operand)?;
                }
                Ok(())
            }
            Expr::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match arg {
                        Arg::Range(range) => write!(f, "{}", range)?,
                        Arg::Expr(expr) => write!(f, "{}", expr)?,
                    }
                }
                write!(f, ")")
            }
        }
    }
}
