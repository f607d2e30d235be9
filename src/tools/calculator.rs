//! Arithmetic calculator tool.
//!
//! Evaluates `+ - * / // % **`, unary signs and parentheses over integers and
//! floats. Integers are arbitrary precision and integer arithmetic stays
//! integral; true division always yields a float; floor division and modulo
//! round toward negative infinity. Float exponentiation that overflows is an
//! error rather than infinity.

use super::ToolReport;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use thiserror::Error;

/// Maximum nesting of parentheses, unary signs and exponents.
const MAX_DEPTH: usize = 200;

/// Largest integer power computed, in bits of the result.
const MAX_POW_BITS: u64 = 1 << 16;

#[derive(Error, Debug, PartialEq)]
pub enum CalcError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token {0:?}")]
    UnexpectedToken(Token),

    #[error("division by zero")]
    DivisionByZero,

    #[error("numerical result out of range")]
    Overflow,

    #[error("result is not a real number")]
    NotReal,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// A numeric value: integral or floating point.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(BigInt),
    Float(f64),
}

impl Number {
    /// Convert to a float; integers too large for `f64` overflow.
    fn as_f64(&self) -> Result<f64, CalcError> {
        match self {
            Number::Int(i) => i
                .to_f64()
                .filter(|x| x.is_finite())
                .ok_or(CalcError::Overflow),
            Number::Float(f) => Ok(*f),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => i.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(BigInt::from(value))
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_') {
                    i += 1;
                }
                // Exponent part, e.g. 1e-3
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let raw: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_number(&raw)?));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Power);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(CalcError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

fn parse_number(raw: &str) -> Result<Number, CalcError> {
    let cleaned = raw.replace('_', "");
    if raw.starts_with('_') || raw.ends_with('_') || cleaned.is_empty() {
        return Err(CalcError::InvalidNumber(raw.to_string()));
    }
    if cleaned.contains(['.', 'e', 'E']) {
        cleaned
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| CalcError::InvalidNumber(raw.to_string()))
    } else {
        cleaned
            .parse::<BigInt>()
            .map(Number::Int)
            .map_err(|_| CalcError::InvalidNumber(raw.to_string()))
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Run a nested rule, failing once the nesting limit is reached.
    fn nested(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<Number, CalcError>,
    ) -> Result<Number, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }

    fn expr(&mut self) -> Result<Number, CalcError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            value = match op {
                Token::Plus => {
                    self.pos += 1;
                    add(value, self.term()?)?
                }
                Token::Minus => {
                    self.pos += 1;
                    sub(value, self.term()?)?
                }
                _ => break,
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Number, CalcError> {
        let mut value = self.unary()?;
        while let Some(op) = self.peek() {
            let apply: fn(Number, Number) -> Result<Number, CalcError> = match op {
                Token::Star => mul,
                Token::Slash => div,
                Token::DoubleSlash => floor_div,
                Token::Percent => modulo,
                _ => break,
            };
            self.pos += 1;
            value = apply(value, self.unary()?)?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Number, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.nested(|p| p.unary().map(negate))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.power(),
        }
    }

    /// `**` binds tighter than a unary sign on its left and is right-associative.
    fn power(&mut self) -> Result<Number, CalcError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Power) {
            self.pos += 1;
            let exponent = self.nested(Self::unary)?;
            return pow(base, exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, CalcError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(CalcError::UnexpectedToken(other)),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(other) => Err(CalcError::UnexpectedToken(other)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

fn float_result(x: f64) -> Result<Number, CalcError> {
    if x.is_nan() {
        Err(CalcError::NotReal)
    } else {
        Ok(Number::Float(x))
    }
}

fn arith(
    a: Number,
    b: Number,
    int: fn(&BigInt, &BigInt) -> BigInt,
    float: fn(f64, f64) -> f64,
) -> Result<Number, CalcError> {
    match (&a, &b) {
        (Number::Int(x), Number::Int(y)) => Ok(Number::Int(int(x, y))),
        _ => float_result(float(a.as_f64()?, b.as_f64()?)),
    }
}

fn add(a: Number, b: Number) -> Result<Number, CalcError> {
    arith(a, b, |x, y| x + y, |x, y| x + y)
}

fn sub(a: Number, b: Number) -> Result<Number, CalcError> {
    arith(a, b, |x, y| x - y, |x, y| x - y)
}

fn mul(a: Number, b: Number) -> Result<Number, CalcError> {
    arith(a, b, |x, y| x * y, |x, y| x * y)
}

fn negate(a: Number) -> Number {
    match a {
        Number::Int(x) => Number::Int(-x),
        Number::Float(x) => Number::Float(-x),
    }
}

fn div(a: Number, b: Number) -> Result<Number, CalcError> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    float_result(a.as_f64()? / b.as_f64()?)
}

fn floor_div(a: Number, b: Number) -> Result<Number, CalcError> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    arith(a, b, |x, y| x.div_floor(y), |x, y| (x / y).floor())
}

fn modulo(a: Number, b: Number) -> Result<Number, CalcError> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    arith(a, b, |x, y| x.mod_floor(y), |x, y| {
        let r = x % y;
        if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
            r + y
        } else {
            r
        }
    })
}

fn pow(base: Number, exponent: Number) -> Result<Number, CalcError> {
    if let (Number::Int(b), Number::Int(e)) = (&base, &exponent) {
        if !e.is_negative() {
            return int_pow(b, e);
        }
    }

    let (x, y) = (base.as_f64()?, exponent.as_f64()?);
    if x == 0.0 && y < 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    let value = x.powf(y);
    if value.is_infinite() && x.is_finite() && y.is_finite() {
        return Err(CalcError::Overflow);
    }
    float_result(value)
}

fn int_pow(base: &BigInt, exponent: &BigInt) -> Result<Number, CalcError> {
    let bits = base.bits();
    // 0, 1 and -1 never grow, whatever the exponent.
    if bits <= 1 {
        let reduced = if exponent.is_zero() {
            0
        } else if exponent.is_even() {
            2
        } else {
            1
        };
        return Ok(Number::Int(base.pow(reduced)));
    }

    let exponent = exponent.to_u32().ok_or(CalcError::Overflow)?;
    if bits.saturating_mul(u64::from(exponent)) > MAX_POW_BITS {
        return Err(CalcError::Overflow);
    }
    Ok(Number::Int(base.pow(exponent)))
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<Number, CalcError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser::new(tokens);
    let value = parser.expr()?;
    match parser.next() {
        None => Ok(value),
        Some(token) => Err(CalcError::UnexpectedToken(token)),
    }
}

/// Run the calculator tool and wrap the outcome in a report.
pub fn calculate(expression: &str) -> ToolReport {
    match evaluate(expression) {
        Ok(value) => ToolReport::completed(format!("Result = {}", value)),
        Err(e) => {
            tracing::debug!("Calculation of '{}' failed: {}", expression, e);
            ToolReport::failed("Calculation Error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolStatus;

    fn eval_str(expr: &str) -> String {
        evaluate(expr).unwrap().to_string()
    }

    #[test]
    fn test_multiplication_report() {
        let report = calculate("28*92");
        assert_eq!(report.message, "Result = 2576");
        assert_eq!(report.total_bill, "NA");
        assert_eq!(report.status, ToolStatus::Completed);
    }

    #[test]
    fn test_precedence_and_parens() {
        assert_eq!(eval_str("2 + 3 * 4"), "14");
        assert_eq!(eval_str("(2 + 3) * 4"), "20");
        assert_eq!(eval_str("2 ** 3 ** 2"), "512");
        assert_eq!(eval_str("-2 ** 2"), "-4");
        assert_eq!(eval_str("2 ** -1"), "0.5");
    }

    #[test]
    fn test_division_semantics() {
        assert_eq!(eval_str("7/2"), "3.5");
        assert_eq!(eval_str("8/4"), "2.0");
        assert_eq!(eval_str("7//2"), "3");
        assert_eq!(eval_str("-7//2"), "-4");
        assert_eq!(eval_str("-7 % 3"), "2");
        assert_eq!(eval_str("7 % -3"), "-2");
        assert_eq!(eval_str("7.5 // 2"), "3.0");
    }

    #[test]
    fn test_floats() {
        assert_eq!(eval_str("0.5 + 0.25"), "0.75");
        assert_eq!(eval_str("1e3"), "1000.0");
        assert_eq!(eval_str("1_000 * 2"), "2000");
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate("1/0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("5 % 0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("2 +"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(CalcError::UnexpectedEnd));
        assert_eq!(
            evaluate("1 2"),
            Err(CalcError::UnexpectedToken(Token::Num(Number::from(2))))
        );
        assert_eq!(evaluate("import os"), Err(CalcError::UnexpectedChar('i')));
        assert_eq!(evaluate("(-8) ** 0.5"), Err(CalcError::NotReal));
    }

    #[test]
    fn test_big_integers() {
        assert_eq!(eval_str("9223372036854775807 + 1"), "9223372036854775808");
        assert_eq!(eval_str("2**100"), "1267650600228229401496703205376");
        assert_eq!(eval_str("10**20"), "100000000000000000000");
        assert_eq!(eval_str("-(10**20) // 3"), "-33333333333333333334");
        assert_eq!(eval_str("10**20 % 7"), "2");
        assert_eq!(eval_str("(-1) ** 1000001"), "-1");
        assert_eq!(eval_str("1 ** 99999999999999999999"), "1");
    }

    #[test]
    fn test_overflow() {
        assert_eq!(evaluate("10.0**400"), Err(CalcError::Overflow));
        assert_eq!(evaluate("2**10**9"), Err(CalcError::Overflow));
        assert_eq!(evaluate("2**2000 + 0.5"), Err(CalcError::Overflow));
        assert_eq!(calculate("10.0**400").message, "Calculation Error");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));
        assert_eq!(calculate(&deep).message, "Calculation Error");

        let signs = format!("{}1", "-".repeat(200_000));
        assert_eq!(evaluate(&signs), Err(CalcError::TooDeep));

        let tower = format!("{}2", "2**".repeat(200_000));
        assert_eq!(evaluate(&tower), Err(CalcError::TooDeep));

        let shallow = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(eval_str(&shallow), "1");
        assert_eq!(eval_str(&format!("{}1", "-".repeat(100))), "1");
    }

    #[test]
    fn test_failed_report() {
        let report = calculate("1/0");
        assert_eq!(report.message, "Calculation Error");
        assert_eq!(report.status, ToolStatus::Failed);
    }
}
