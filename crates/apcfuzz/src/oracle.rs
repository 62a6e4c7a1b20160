//! Reference arithmetic
//!
//! Ground truth for every comparison. Values are unbounded [`BigInt`]s.
//!
//! Division convention: `/` truncates toward zero and `%` takes the sign of
//! the dividend, so `a == (a / b) * b + a % b` for every non-zero `b`.
//!
//! Numerals use the alphabet `0-9a-z`, read case-insensitively and written in
//! lowercase. Zero is written `"0"`; no other value has leading zeros.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::limbs::check_base;

/// Evaluate an expression tree.
pub fn evaluate(expr: &Expr) -> Result<BigInt> {
    match expr {
        Expr::Number { value, .. } => Ok(value.clone()),
        Expr::Unary { op, operand, .. } => {
            let v = evaluate(operand)?;
            Ok(match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => -v,
            })
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            let a = evaluate(lhs)?;
            let b = evaluate(rhs)?;
            apply(*op, &a, &b)
        }
    }
}

/// Apply one binary operator.
pub fn apply(op: BinaryOp, a: &BigInt, b: &BigInt) -> Result<BigInt> {
    if op.is_division() && b.is_zero() {
        return Err(Error::DivisionByZero);
    }
    Ok(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        // num-bigint truncates toward zero for signed division.
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
    })
}

/// Read an unsigned digit string in `base`.
pub fn parse_numeral(digits: &str, base: u32) -> Result<BigInt> {
    check_base(base)?;
    if digits.is_empty() {
        return Err(Error::parse_at("empty numeral", 0));
    }
    if let Some(digit) = digits.chars().find(|c| c.to_digit(base).is_none()) {
        return Err(Error::InvalidDigit { digit, base });
    }
    BigInt::parse_bytes(digits.as_bytes(), base)
        .ok_or_else(|| Error::parse_at(format!("unreadable numeral '{digits}'"), 0))
}

/// Write a value in `base` with the canonical lowercase alphabet.
pub fn render_numeral(value: &BigInt, base: u32) -> Result<String> {
    check_base(base)?;
    Ok(value.to_str_radix(base))
}

/// Convert a digit string from one base to another.
pub fn convert(digits: &str, source_base: u32, target_base: u32) -> Result<String> {
    let value = parse_numeral(digits, source_base)?;
    render_numeral(&value, target_base)
}

/// Read a subject-style numeral: an optional sign, digits, and an optional
/// `_<base>` suffix (decimal digits). Without a suffix the base is 10.
pub fn parse_suffixed(text: &str) -> Result<BigInt> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (digits, base) = match body.split_once('_') {
        Some((digits, base)) => {
            let base = base
                .parse::<u32>()
                .map_err(|_| Error::parse_at(format!("bad base suffix '{base}'"), digits.len() + 1))?;
            (digits, base)
        }
        None => (body, crate::limbs::DEFAULT_BASE),
    };
    let magnitude = parse_numeral(digits, base)?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Render a value the way the comparator expects a decimal reply.
pub fn decimal(value: &BigInt) -> String {
    value.to_str_radix(10)
}
