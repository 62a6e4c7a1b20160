//! Expression tree and its textual renderings
//!
//! An [`Expr`] is built once and then rendered by independent [`Renderer`]s:
//! [`Canonical`] produces text the oracle reads, [`SubjectSyntax`] produces the
//! text handed to the subject. Both renderings denote the same value.
//!
//! Nodes carry spelling hints (multiplication notation, an extra parenthesis
//! layer around unary operators, the base a literal is written in). The
//! canonical renderer ignores them; the subject renderer uses them to exercise
//! more of the subject's grammar.

use std::fmt;

use num_bigint::BigInt;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

use crate::limbs::DEFAULT_BASE;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn symbol(self) -> char {
        match self {
            UnaryOp::Plus => '+',
            UnaryOp::Minus => '-',
        }
    }
}

/// Infix operators. `Div` and `Rem` are integer division and remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 5] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
    ];

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Rem => '%',
        }
    }

    /// Short name used as a statistics axis.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "mod",
        }
    }

    /// Right operand must be non-zero.
    pub fn is_division(self) -> bool {
        matches!(self, BinaryOp::Div | BinaryOp::Rem)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a product is written in subject syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MulSpelling {
    /// `a * b`
    #[default]
    Explicit,
    /// `(a)b`
    GroupLeft,
    /// `a(b)`
    GroupRight,
    /// `(a)(b)`
    GroupBoth,
}

impl MulSpelling {
    pub const ALL: [MulSpelling; 4] = [
        MulSpelling::Explicit,
        MulSpelling::GroupLeft,
        MulSpelling::GroupRight,
        MulSpelling::GroupBoth,
    ];
}

/// A generated or parsed arithmetic expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An integer literal, written in `base` in subject syntax.
    Number { value: BigInt, base: u32 },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        /// Wrap the whole unary expression in one more pair of parentheses.
        grouped: bool,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        /// Only meaningful for [`BinaryOp::Mul`].
        spelling: MulSpelling,
    },
}

impl Expr {
    pub fn number(value: impl Into<BigInt>) -> Self {
        Expr::Number {
            value: value.into(),
            base: DEFAULT_BASE,
        }
    }

    pub fn number_in_base(value: impl Into<BigInt>, base: u32) -> Self {
        Expr::Number {
            value: value.into(),
            base,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            grouped: false,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            spelling: MulSpelling::Explicit,
        }
    }

    /// Visit every node, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Number { .. } => {}
            Expr::Unary { operand, .. } => operand.walk(visit),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
        }
    }

    /// Distinct binary operators used anywhere in the tree, in a fixed order.
    pub fn binary_ops(&self) -> Vec<BinaryOp> {
        let mut seen = Vec::new();
        self.walk(&mut |node| {
            if let Expr::Binary { op, .. } = node {
                if !seen.contains(op) {
                    seen.push(*op);
                }
            }
        });
        seen.sort();
        seen
    }

    /// Does the tree contain a unary operator?
    pub fn has_unary(&self) -> bool {
        let mut found = false;
        self.walk(&mut |node| found |= matches!(node, Expr::Unary { .. }));
        found
    }

    /// Height of the tree; a lone literal has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Number { .. } => 0,
            Expr::Unary { operand, .. } => 1 + operand.depth(),
            Expr::Binary { lhs, rhs, .. } => 1 + lhs.depth().max(rhs.depth()),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Canonical.render(self))
    }
}

/// Turns an expression tree into text for one consumer.
pub trait Renderer {
    fn render(&self, expr: &Expr) -> String;
}

/// Oracle syntax: decimal literals, explicit operators, fully parenthesized
/// binary nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonical;

impl Renderer for Canonical {
    fn render(&self, expr: &Expr) -> String {
        match expr {
            Expr::Number { value, .. } => {
                if value.is_negative() {
                    format!("(-{})", value.abs())
                } else {
                    value.to_string()
                }
            }
            Expr::Unary { op, operand, .. } => {
                format!("{}{}", op.symbol(), guard_sign(self.render(operand)))
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                format!("({} {} {})", self.render(lhs), op.symbol(), self.render(rhs))
            }
        }
    }
}

/// Subject syntax: literals in their own base with a `_<base>` suffix when not
/// decimal, and the spelling hints applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectSyntax;

impl Renderer for SubjectSyntax {
    fn render(&self, expr: &Expr) -> String {
        match expr {
            Expr::Number { value, base } => {
                let digits = numeral_with_suffix(&value.abs(), *base);
                if value.is_negative() {
                    format!("(-{digits})")
                } else {
                    digits
                }
            }
            Expr::Unary {
                op,
                operand,
                grouped,
            } => {
                let text = format!("{}{}", op.symbol(), guard_sign(self.render(operand)));
                if *grouped { format!("({text})") } else { text }
            }
            Expr::Binary {
                op: BinaryOp::Mul,
                lhs,
                rhs,
                spelling,
            } => {
                let lhs = self.render(lhs);
                let rhs = self.render(rhs);
                match spelling {
                    MulSpelling::Explicit => format!("({lhs} * {rhs})"),
                    MulSpelling::GroupLeft => format!("(({lhs}){})", guard_sign(rhs)),
                    MulSpelling::GroupRight => format!("({}({rhs}))", guard_sign(lhs)),
                    MulSpelling::GroupBoth => format!("(({lhs})({rhs}))"),
                }
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                format!("({} {} {})", self.render(lhs), op.symbol(), self.render(rhs))
            }
        }
    }
}

/// Write a non-negative value in `base`, suffixed with `_<base>` unless the
/// base is the subject's default.
pub fn numeral_with_suffix(magnitude: &BigInt, base: u32) -> String {
    let digits = magnitude.to_str_radix(base);
    if base == DEFAULT_BASE {
        digits
    } else {
        format!("{digits}_{base}")
    }
}

// Text starting with a sign would attach to whatever precedes it.
fn guard_sign(text: String) -> String {
    if text.starts_with(['+', '-']) {
        format!("({text})")
    } else {
        text
    }
}
