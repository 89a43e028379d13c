//! Sandboxed arithmetic
//!
//! Evaluates spoken "calculate ..." expressions with a small recursive-descent
//! parser. Only numbers, `+ - * / % ( )`, `//` and `**` are understood; there
//! are no names, calls or side effects.
//!
//! All arithmetic is `f64`. `/` is true division, `//` floors, and `%` takes
//! the sign of the divisor (`-7 % 3 == 2`). Unary minus binds looser than
//! `**`, so `-2 ** 2 == -4`.

use thiserror::Error;

/// Characters an expression may contain before it is even parsed
pub const ALLOWED_CHARS: &str = "0123456789+-*/(). %";

/// Deepest nesting of parentheses, signs and exponents the parser will follow
pub const MAX_DEPTH: usize = 64;

/// Arithmetic failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// A character outside [`ALLOWED_CHARS`]
    #[error("disallowed character {0:?}")]
    DisallowedCharacter(char),

    /// A malformed numeric literal such as `1.2.3`
    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    /// A token where something else was required
    #[error("unexpected {0:?}")]
    UnexpectedToken(String),

    /// Input ended in the middle of an expression
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Division, floor division or modulo by zero
    #[error("division by zero")]
    DivisionByZero,

    /// The result overflowed or is not a number
    #[error("result is not a finite number")]
    NonFinite,

    /// Nesting beyond [`MAX_DEPTH`]
    #[error("expression nested too deeply")]
    TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    LParen,
    RParen,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Plus => "+".into(),
            Self::Minus => "-".into(),
            Self::Star => "*".into(),
            Self::StarStar => "**".into(),
            Self::Slash => "/".into(),
            Self::SlashSlash => "//".into(),
            Self::Percent => "%".into(),
            Self::LParen => "(".into(),
            Self::RParen => ")".into(),
        }
    }
}

/// Reject an expression containing anything outside [`ALLOWED_CHARS`]
///
/// # Errors
///
/// Returns the first disallowed character
pub fn validate(expr: &str) -> Result<(), CalcError> {
    match expr.chars().find(|c| !ALLOWED_CHARS.contains(*c)) {
        Some(c) => Err(CalcError::DisallowedCharacter(c)),
        None => Ok(()),
    }
}

/// Validate and evaluate an expression
///
/// # Errors
///
/// Returns error for disallowed characters, syntax errors, division by zero
/// and non-finite results
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    validate(expr)?;

    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some(tok) = parser.peek() {
        return Err(CalcError::UnexpectedToken(tok.describe()));
    }
    if !value.is_finite() {
        return Err(CalcError::NonFinite);
    }

    Ok(value)
}

/// Render a result the way it should be spoken
///
/// Whole numbers drop the fractional part: `4`, not `4.0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let token = match c {
            ' ' => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                if literal == "." {
                    return Err(CalcError::UnexpectedToken(literal));
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(literal))?;
                tokens.push(Token::Num(value));
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if next == Some('*') => {
                i += 1;
                Token::StarStar
            }
            '*' => Token::Star,
            '/' if next == Some('/') => {
                i += 1;
                Token::SlashSlash
            }
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(CalcError::DisallowedCharacter(other)),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr := term (("+" | "-") term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (("*" | "/" | "//" | "%") unary)*
    #[allow(clippy::float_cmp)]
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::SlashSlash | Token::Percent)) =
            self.peek()
        {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                _ if rhs == 0.0 => return Err(CalcError::DivisionByZero),
                Token::Slash => value / rhs,
                Token::SlashSlash => (value / rhs).floor(),
                _ => value - rhs * (value / rhs).floor(),
            };
        }
        Ok(value)
    }

    // Every recursive path (parens, signs, exponents) goes through here
    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    // unary := ("+" | "-") unary | power
    fn signed(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            _ => self.power(),
        }
    }

    // power := atom ("**" unary)?
    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::StarStar) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // atom := number | "(" expr ")"
    fn atom(&mut self) -> Result<f64, CalcError> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    Some(tok) => Err(CalcError::UnexpectedToken(tok.describe())),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(tok) => Err(CalcError::UnexpectedToken(tok.describe())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}
