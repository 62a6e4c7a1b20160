//! In-process stand-ins for the calculator binary
//!
//! Replies mimic the real binary: the input is echoed, then ` = `, then the
//! value in uppercase, with `_<base>` appended when the base is not 10.

#![allow(dead_code)]

use apcfuzz::oracle;
use apcfuzz::parser;
use apcfuzz::{BinaryOp, Error, Expr, Result, Subject};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Division flavour of a stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero, like the oracle.
    Truncate,
    /// Round toward negative infinity.
    Floor,
}

/// A well-behaved subject backed by the reader and the oracle.
pub struct StubSubject {
    pub rounding: Rounding,
}

impl StubSubject {
    pub fn new() -> Self {
        Self {
            rounding: Rounding::Truncate,
        }
    }

    pub fn flooring() -> Self {
        Self {
            rounding: Rounding::Floor,
        }
    }
}

impl Subject for StubSubject {
    fn invoke(&self, input: &str) -> Result<String> {
        let query = match parser::parse_query(input) {
            Ok(query) => query,
            Err(_) => return Ok(format!("{input} = syntax error\n")),
        };
        let expr = match self.rounding {
            Rounding::Truncate => query.expr.clone(),
            Rounding::Floor => floor_division(&query.expr),
        };
        let value = match oracle::evaluate(&expr) {
            Ok(value) => value,
            Err(_) => return Ok(format!("{input} = value error\n")),
        };
        let base = query.target_base.unwrap_or(10);
        let digits = oracle::render_numeral(&value, base)?.to_uppercase();
        if base == 10 {
            Ok(format!("{input} = {digits}\n"))
        } else {
            Ok(format!("{input} = {digits}_{base}\n"))
        }
    }

    fn name(&self) -> String {
        "stub".to_string()
    }
}

// Rewrite `a / b` and `a % b` so they evaluate with floor semantics.
fn floor_division(expr: &Expr) -> Expr {
    match expr {
        Expr::Number { .. } => expr.clone(),
        Expr::Unary { op, operand, grouped } => Expr::Unary {
            op: *op,
            operand: Box::new(floor_division(operand)),
            grouped: *grouped,
        },
        Expr::Binary { op, lhs, rhs, spelling } => {
            let lhs = floor_division(lhs);
            let rhs = floor_division(rhs);
            if op.is_division() {
                let (Ok(a), Ok(b)) = (oracle::evaluate(&lhs), oracle::evaluate(&rhs)) else {
                    return Expr::binary(*op, lhs, rhs);
                };
                if b.is_zero() {
                    return Expr::binary(*op, lhs, rhs);
                }
                let value = floor_op(*op, &a, &b);
                return Expr::number(value);
            }
            Expr::Binary {
                op: *op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                spelling: *spelling,
            }
        }
    }
}

fn floor_op(op: BinaryOp, a: &BigInt, b: &BigInt) -> BigInt {
    let mut q = a / b;
    let mut r = a % b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        q -= 1u32;
        r += b;
    }
    match op {
        BinaryOp::Div => q,
        _ => r,
    }
}

/// A subject that cannot be started.
pub struct MissingSubject;

impl Subject for MissingSubject {
    fn invoke(&self, _input: &str) -> Result<String> {
        Err(Error::Invocation("cannot start build/apc".to_string()))
    }

    fn name(&self) -> String {
        "missing".to_string()
    }
}
