//! Recursive-descent formula parser.
//!
//! Grammar:
//!
//! ```text
//! formula  := "="? expr EOF
//! expr     := term (("+" | "-") term)*
//! term     := unary (("*" | "/") unary)*
//! unary    := ("-" | "+") unary | primary
//! primary  := NUMBER | CELL | IDENT "(" args ")" | "(" expr ")"
//! args     := arg ("," arg)*
//! arg      := CELL ":" CELL | expr
//! ```
//!
//! Only numeric literals, cell references, the range functions and the four
//! arithmetic operators are accepted. Nothing is ever handed to a general
//! purpose evaluator.

use thiserror::Error;

use super::ast::{Arg, BinaryOp, Expr, Function, UnaryOp};
use super::cell_ref::CellRange;
use super::lexer::{Lexer, Token};

/// Deepest parenthesis / unary nesting accepted before giving up.
const MAX_NESTING: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty formula")]
    Empty,
    #[error("unexpected {found}")]
    Unexpected { found: String },
    #[error("expected {expected}, found {found}")]
    Expected { expected: &'static str, found: String },
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("formula nested too deeply")]
    TooDeep,
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse formula text (with or without the leading '=').
pub fn parse_formula(input: &str) -> ParseResult<Expr> {
    Parser::new(input).parse()
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Parser {
            lexer,
            current,
            depth: 0,
        }
    }

    pub fn parse(&mut self) -> ParseResult<Expr> {
        if self.current == Token::Equals {
            self.advance();
        }
        if self.current == Token::Eof {
            return Err(ParseError::Empty);
        }

        let expr = self.parse_expr()?;
        if self.current != Token::Eof {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn expect(&mut self, expected: Token, name: &'static str) -> ParseResult<()> {
        if self.current == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: name,
                found: describe(&self.current),
            })
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::Unexpected {
            found: describe(&self.current),
        }
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let first = self.parse_term()?;
        self.parse_sum_tail(first)
    }

    /// Remaining `(+|-) term` pairs after the first term of a sum.
    fn parse_sum_tail(&mut self, first: Expr) -> ParseResult<Expr> {
        let mut rest = Vec::new();
        loop {
            let op = match self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(Expr::binary(first, rest)),
            };
            self.advance();
            rest.push((op, self.parse_term()?));
        }
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let first = self.parse_unary()?;
        self.parse_product_tail(first)
    }

    /// Remaining `(*|/) unary` pairs after the first factor of a product.
    fn parse_product_tail(&mut self, first: Expr) -> ParseResult<Expr> {
        let mut rest = Vec::new();
        loop {
            let op = match self.current {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => return Ok(Expr::binary(first, rest)),
            };
            self.advance();
            rest.push((op, self.parse_unary()?));
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current {
            Token::Minus => UnaryOp::Minus,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_primary(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary();
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Cell(cell) => {
                if self.current == Token::Colon {
                    // A bare range only means something as a function argument.
                    return Err(self.unexpected());
                }
                Ok(Expr::Ref(cell))
            }
            Token::Ident(name) => {
                let function =
                    Function::from_name(&name).ok_or(ParseError::UnknownFunction(name))?;
                self.expect(Token::LParen, "'('")?;
                self.enter()?;
                let args = self.parse_args();
                self.leave();
                let args = args?;
                self.expect(Token::RParen, "')'")?;
                Ok(Expr::Call { function, args })
            }
            Token::LParen => {
                self.enter()?;
                let inner = self.parse_expr();
                self.leave();
                let inner = inner?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(ParseError::Unexpected {
                found: describe(&other),
            }),
        }
    }

    fn parse_args(&mut self) -> ParseResult<Vec<Arg>> {
        let mut args = vec![self.parse_arg()?];
        while self.current == Token::Comma {
            self.advance();
            args.push(self.parse_arg()?);
        }
        Ok(args)
    }

    fn parse_arg(&mut self) -> ParseResult<Arg> {
        if let Token::Cell(start) = &self.current {
            let start = start.clone();
            // Look one token past the cell to tell `A1:B2` from `A1 + 1`.
            let after = self.lexer.next_token();
            if after == Token::Colon {
                self.current = self.lexer.next_token();
                return match self.advance() {
                    Token::Cell(end) => Ok(Arg::Range(CellRange::new(start, end))),
                    other => Err(ParseError::Expected {
                        expected: "cell reference after ':'",
                        found: describe(&other),
                    }),
                };
            }
            self.current = after;
            let lhs = Expr::Ref(start);
            return self.continue_expr(lhs).map(Arg::Expr);
        }
        self.parse_expr().map(Arg::Expr)
    }

    /// Finish parsing an expression whose first primary was already consumed.
    fn continue_expr(&mut self, first: Expr) -> ParseResult<Expr> {
        let term = self.parse_product_tail(first)?;
        self.parse_sum_tail(term)
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number {}", n),
        Token::Cell(cell) => format!("cell {}", cell),
        Token::Ident(name) => format!("name {}", name),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Invalid(text) => format!("'{}'", text),
        Token::Eof => "end of formula".to_string(),
    }
}
