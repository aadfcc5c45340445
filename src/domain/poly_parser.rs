//! Polynomial expression parser.
//!
//! Recursive descent over the grammar
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('^' | '**') integer)?
//! primary := number | identifier | '(' expr ')'
//! ```
//!
//! Numbers are exact decimals. The ring of the result holds the identifiers
//! in order of first appearance.

use crate::domain::error::{ParseError, QuboError};
use crate::domain::polynomial::{Coefficient, Polynomial, Ring};
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, Zero};
use std::sync::Arc;

const MAX_EXPONENT: u32 = 64;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    ring: Arc<Ring>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, ring: Arc<Ring>) -> Self {
        Self {
            input,
            pos: 0,
            ring,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>, position: usize) -> ParseError {
        ParseError {
            message: message.into(),
            position,
        }
    }

    fn found(&self) -> String {
        self.peek()
            .map(|c| format!("'{}'", c))
            .unwrap_or_else(|| "end of input".to_string())
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error(
                format!("expected '{}', found {}", expected, self.found()),
                self.pos,
            )),
        }
    }

    fn lift(
        &self,
        result: Result<Polynomial, QuboError>,
        position: usize,
    ) -> Result<Polynomial, ParseError> {
        result.map_err(|e| self.error(e.to_string(), position))
    }

    fn parse_number(&mut self) -> Result<Coefficient, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut value = Coefficient::zero();
        let mut scale = Coefficient::from_integer(1);
        let mut digits = 0;
        let mut seen_dot = false;
        let ten = Coefficient::from_integer(10);
        let input = self.input;
        let too_large = || ParseError {
            message: format!("number too large: {}", &input[start..]),
            position: start,
        };

        while let Some(ch) = self.peek() {
            if let Some(d) = ch.to_digit(10) {
                let d = Coefficient::from_integer(i64::from(d));
                if seen_dot {
                    scale = scale.checked_mul(&ten).ok_or_else(too_large)?;
                    value = d
                        .checked_div(&scale)
                        .and_then(|frac| value.checked_add(&frac))
                        .ok_or_else(too_large)?;
                } else {
                    value = value
                        .checked_mul(&ten)
                        .and_then(|v| v.checked_add(&d))
                        .ok_or_else(too_large)?;
                }
                digits += 1;
                self.advance();
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(self.error("expected number", start));
        }
        Ok(value)
    }

    fn parse_exponent(&mut self) -> Result<u32, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let digits = &self.input[start..self.pos];
        if digits.is_empty() {
            return Err(self.error(
                format!("expected integer exponent, found {}", self.found()),
                start,
            ));
        }
        match digits.parse::<u32>() {
            Ok(e) if e <= MAX_EXPONENT => Ok(e),
            _ => Err(self.error(
                format!("exponent {} exceeds {}", digits, MAX_EXPONENT),
                start,
            )),
        }
    }

    fn parse_identifier(&mut self) -> Result<Polynomial, ParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let name = &self.input[start..self.pos];
        let result = Polynomial::variable(Arc::clone(&self.ring), name);
        self.lift(result, start)
    }

    fn parse_primary(&mut self) -> Result<Polynomial, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch.is_ascii_digit() || ch == '.' => {
                let value = self.parse_number()?;
                Ok(Polynomial::constant(Arc::clone(&self.ring), value))
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.parse_identifier(),
            Some('(') => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_char(')')?;
                Ok(inner)
            }
            _ => Err(self.error(format!("expected term, found {}", self.found()), self.pos)),
        }
    }

    fn parse_power(&mut self) -> Result<Polynomial, ParseError> {
        let base = self.parse_primary()?;
        self.skip_whitespace();
        let start = self.pos;
        if self.remaining().starts_with("**") {
            self.pos += 2;
        } else if self.peek() == Some('^') {
            self.advance();
        } else {
            return Ok(base);
        }
        let exponent = self.parse_exponent()?;
        self.lift(base.pow(exponent), start)
    }

    fn parse_unary(&mut self) -> Result<Polynomial, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('-') => {
                self.advance();
                Ok(self.parse_unary()?.negated())
            }
            Some('+') => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_term(&mut self) -> Result<Polynomial, ParseError> {
        let mut acc = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            let start = self.pos;
            match self.peek() {
                Some('*') => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    acc = self.lift(acc.checked_mul(&rhs), start)?;
                }
                Some('/') => {
                    self.advance();
                    self.skip_whitespace();
                    let divisor_start = self.pos;
                    let rhs = self.parse_unary()?;
                    let divisor = match rhs.as_constant() {
                        Some(c) if c.is_zero() => {
                            return Err(self.error("division by zero", divisor_start));
                        }
                        Some(c) => c,
                        None => {
                            return Err(self.error(
                                "division is only supported by constants",
                                divisor_start,
                            ));
                        }
                    };
                    acc = self.lift(acc.scale(divisor.recip()), start)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Polynomial, ParseError> {
        let mut acc = self.parse_term()?;
        loop {
            self.skip_whitespace();
            let start = self.pos;
            match self.peek() {
                Some('+') => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    acc = self.lift(acc.checked_add(&rhs), start)?;
                }
                Some('-') => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    acc = self.lift(acc.checked_sub(&rhs), start)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn parse(&mut self) -> Result<Polynomial, ParseError> {
        let poly = self.parse_expr()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(
                format!("unexpected input after expression: '{}'", self.remaining()),
                self.pos,
            ));
        }
        Ok(poly)
    }
}

/// Identifiers in order of first appearance. Digits inside a numeric
/// literal never start an identifier.
fn scan_identifiers(input: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if ch.is_alphabetic() || ch == '_' {
            let mut end = start + ch.len_utf8();
            while let Some(&(i, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            names.push(input[start..end].to_string());
        } else if ch.is_ascii_digit() || ch == '.' {
            while chars
                .peek()
                .is_some_and(|&(_, c)| c.is_ascii_digit() || c == '.')
            {
                chars.next();
            }
        }
    }
    names
}

pub fn parse(input: &str) -> Result<Polynomial, ParseError> {
    let ring = Arc::new(Ring::new(scan_identifiers(input)));
    let mut parser = Parser::new(input, ring);
    parser.parse()
}
