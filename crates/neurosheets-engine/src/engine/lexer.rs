//! Formula tokenizer.
//!
//! Splits formula text into [`Token`]s. Identifiers are upper-cased so the
//! rest of the pipeline is case-insensitive; letters immediately followed by
//! digits form a cell reference (`b7` -> `B7`).

use std::iter::Peekable;
use std::str::Chars;

use super::cell_ref::CellRef;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    /// A cell address such as `A1` or `AB12`.
    Cell(CellRef),
    /// A bare name such as `SUM`.
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Colon,
    Equals,
    /// Text the lexer could not turn into a token.
    Invalid(String),
    Eof,
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Star,
            Some('/') => Token::Slash,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some(',') => Token::Comma,
            Some(':') => Token::Colon,
            Some('=') => Token::Equals,
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),
            Some(ch) if ch.is_ascii_alphabetic() => self.read_identifier(ch),
            Some(ch) => Token::Invalid(ch.to_string()),
            None => Token::Eof,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.input.next_if(|ch| ch.is_whitespace()).is_some() {}
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.input.next_if(|ch| ch.is_ascii_digit()) {
            out.push(ch);
        }
    }

    fn read_number(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        self.read_digits(&mut text);
        if first != '.' && self.input.next_if_eq(&'.').is_some() {
            text.push('.');
            self.read_digits(&mut text);
        }
        if let Some(e) = self.input.next_if(|ch| *ch == 'e' || *ch == 'E') {
            text.push(e);
            if let Some(sign) = self.input.next_if(|ch| *ch == '+' || *ch == '-') {
                text.push(sign);
            }
            self.read_digits(&mut text);
        }
        // A trailing '.' or a second decimal point makes the literal malformed.
        if let Some(ch) = self.input.next_if(|ch| *ch == '.' || ch.is_ascii_alphanumeric()) {
            text.push(ch);
            return Token::Invalid(text);
        }

        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Token::Number(n),
            _ => Token::Invalid(text),
        }
    }

    fn read_identifier(&mut self, first: char) -> Token {
        let mut letters = String::from(first.to_ascii_uppercase());
        while let Some(ch) = self.input.next_if(|ch| ch.is_ascii_alphabetic()) {
            letters.push(ch.to_ascii_uppercase());
        }

        let mut digits = String::new();
        self.read_digits(&mut digits);
        if digits.is_empty() {
            return Token::Ident(letters);
        }

        let text = format!("{}{}", letters, digits);
        if self.input.peek().is_some_and(|ch| ch.is_ascii_alphanumeric()) {
            return Token::Invalid(text);
        }
        match CellRef::from_str(&text) {
            Some(cell) => Token::Cell(cell),
            None => Token::Invalid(text),
        }
    }
}

/// Tokenize a whole string, ending with [`Token::Eof`].
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
