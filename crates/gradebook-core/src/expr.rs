//! Arithmetic expression parsing.
//!
//! A small recursive-descent parser for formulas over `+ - * / ( )`, decimal
//! literals and component identifiers. Parsing produces an [`Expr`] tree that
//! can be evaluated any number of times against different bindings.

use std::collections::HashMap;

use crate::error::FormulaError;

/// Default cap on formula length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// Default cap on parenthesis / unary nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied while parsing a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_length: usize,
    pub max_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
        }
    }
}

/// Parsed formula tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Identifier, stored uppercased.
    Variable(String),
    Neg(Box<Expr>),
    /// A left-associative run of same-precedence operators:
    /// `first op1 e1 op2 e2 ...`. Kept flat so long sums stay shallow.
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
}

impl Expr {
    /// Evaluate against `bindings`, whose keys must be uppercase.
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Result<f64, FormulaError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| FormulaError::UnboundVariable(name.clone())),
            Expr::Neg(inner) => Ok(-inner.eval(bindings)?),
            Expr::Chain { first, rest } => {
                let mut acc = first.eval(bindings)?;
                for (op, operand) in rest {
                    acc = op.apply(acc, operand.eval(bindings)?);
                }
                Ok(acc)
            }
        }
    }

    /// Collect every variable name referenced by the tree, in first-seen order.
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Expr::Neg(inner) => inner.collect_variables(out),
            Expr::Chain { first, rest } => {
                first.collect_variables(out);
                for (_, operand) in rest {
                    operand.collect_variables(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let start = i;
        match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => tokens.push((Token::Plus, start)),
            '-' => tokens.push((Token::Minus, start)),
            '*' => tokens.push((Token::Star, start)),
            '/' => tokens.push((Token::Slash, start)),
            '(' => tokens.push((Token::LParen, start)),
            ')' => tokens.push((Token::RParen, start)),
            c if c.is_ascii_digit() || c == '.' => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(literal.clone()))?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                tokens.push((Token::Ident(name.to_uppercase()), start));
                continue;
            }
            other => return Err(FormulaError::UnexpectedChar { ch: other, pos: start }),
        }
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep(self.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let first = self.term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            rest.push((op, self.term()?));
        }
        Ok(chain(first, rest))
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Expr, FormulaError> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            rest.push((op, self.unary()?));
        }
        Ok(chain(first, rest))
    }

    // unary := ('+' | '-') unary | primary
    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                self.enter()?;
                let inner = self.unary()?;
                self.leave();
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.enter()?;
                let inner = self.unary()?;
                self.leave();
                Ok(inner)
            }
            _ => self.primary(),
        }
    }

    // primary := NUMBER | IDENT | '(' expr ')'
    fn primary(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(Expr::Number(n)),
            Some((Token::Ident(name), _)) => Ok(Expr::Variable(name)),
            Some((Token::LParen, _)) => {
                self.enter()?;
                let inner = self.expr()?;
                self.leave();
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((tok, pos)) => Err(FormulaError::UnexpectedToken {
                        found: tok.describe(),
                        pos,
                    }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((tok, pos)) => Err(FormulaError::UnexpectedToken {
                found: tok.describe(),
                pos,
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain {
            first: Box::new(first),
            rest,
        }
    }
}

/// Parse `input` into an expression tree with the default limits.
pub fn parse(input: &str) -> Result<Expr, FormulaError> {
    parse_with_limits(input, ParseLimits::default())
}

/// Parse `input` into an expression tree.
pub fn parse_with_limits(input: &str, limits: ParseLimits) -> Result<Expr, FormulaError> {
    let len = input.chars().count();
    if len > limits.max_length {
        return Err(FormulaError::TooLong {
            len,
            max: limits.max_length,
        });
    }

    let mut parser = Parser {
        tokens: tokenize(input)?,
        cursor: 0,
        depth: 0,
        max_depth: limits.max_depth,
    };
    let expr = parser.expr()?;

    match parser.advance() {
        None => Ok(expr),
        Some((tok, pos)) => Err(FormulaError::UnexpectedToken {
            found: tok.describe(),
            pos,
        }),
    }
}
