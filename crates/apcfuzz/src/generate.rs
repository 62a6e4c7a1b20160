//! Test case generation
//!
//! Three case sources, each a lazy iterator that can be restarted from its
//! seed:
//! - [`ArithmeticCases`]: random expression trees rendered in both syntaxes.
//! - [`NumeralCases`]: random numerals with a random source/target base pair.
//! - [`BaseMatrix`]: every ordered pair of distinct bases, in order, with a
//!   fixed number of random numerals per pair.

use num_bigint::BigInt;
use num_traits::Zero;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::expr::{BinaryOp, Canonical, Expr, MulSpelling, Renderer, SubjectSyntax, UnaryOp};
use crate::limbs::{self, DEFAULT_BASE, MAX_BASE, MIN_BASE};
use crate::weights::{Shape, WeightTable};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One arithmetic case: the tree and both of its renderings.
#[derive(Debug, Clone)]
pub struct ArithmeticCase {
    pub index: usize,
    pub expr: Expr,
    /// Text for the oracle.
    pub canonical: String,
    /// Text for the subject.
    pub subject: String,
}

/// One base-conversion case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumeralCase {
    pub index: usize,
    /// Digits valid in `source_base`, without any suffix.
    pub digits: String,
    pub source_base: u32,
    pub target_base: u32,
    /// Whether the request spells out `_<source_base>`.
    pub suffixed: bool,
}

impl NumeralCase {
    /// Subject request: `<digits>[_<source>] # <target>`.
    pub fn request(&self) -> String {
        if self.suffixed {
            format!("{}_{} # {}", self.digits, self.source_base, self.target_base)
        } else {
            format!("{} # {}", self.digits, self.target_base)
        }
    }
}

/// Builds random expression trees.
#[derive(Debug, Clone)]
pub struct ExprGenerator {
    config: GeneratorConfig,
    shapes: WeightTable<Shape>,
    operators: WeightTable<BinaryOp>,
    unary_ops: WeightTable<UnaryOp>,
}

impl ExprGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            shapes: config.shape_weights.table()?,
            operators: config.operator_weights.table()?,
            unary_ops: WeightTable::new([(UnaryOp::Plus, 1), (UnaryOp::Minus, 1)])?,
        })
    }

    /// A tree rooted at `depth`; nodes at `max_depth` are leaves.
    pub fn expr<R: Rng + ?Sized>(&self, rng: &mut R, depth: usize) -> Expr {
        if depth >= self.config.max_depth {
            return self.leaf(rng);
        }
        match self.shapes.sample(rng) {
            Shape::Leaf => self.leaf(rng),
            Shape::Unary => Expr::Unary {
                op: self.unary_ops.sample(rng),
                operand: Box::new(self.expr(rng, depth + 1)),
                grouped: rng.gen_bool(self.config.unary_group_probability),
            },
            Shape::Binary => {
                let op = self.operators.sample(rng);
                let lhs = self.expr(rng, depth + 1);
                let rhs = if op.is_division() {
                    self.divisor(rng)
                } else {
                    self.expr(rng, depth + 1)
                };
                let spelling = if op == BinaryOp::Mul {
                    MulSpelling::ALL[rng.gen_range(0..MulSpelling::ALL.len())]
                } else {
                    MulSpelling::Explicit
                };
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    spelling,
                }
            }
        }
    }

    /// A literal below `10^e` for a random digit count `e`.
    pub fn leaf<R: Rng + ?Sized>(&self, rng: &mut R) -> Expr {
        let exponent = rng.gen_range(0..=self.config.max_leaf_digits);
        let magnitude = random_decimal(rng, exponent);
        self.signed_literal(rng, magnitude)
    }

    /// A non-zero literal of at most `max_divisor_digits` digits.
    pub fn divisor<R: Rng + ?Sized>(&self, rng: &mut R) -> Expr {
        let exponent = rng.gen_range(1..=self.config.max_divisor_digits);
        let magnitude = loop {
            let candidate = random_decimal(rng, exponent);
            if !candidate.is_zero() {
                break candidate;
            }
        };
        self.signed_literal(rng, magnitude)
    }

    fn signed_literal<R: Rng + ?Sized>(&self, rng: &mut R, magnitude: BigInt) -> Expr {
        let value = if rng.gen_bool(self.config.negative_probability) {
            -magnitude
        } else {
            magnitude
        };
        let base = if rng.gen_bool(self.config.based_literal_probability) {
            rng.gen_range(MIN_BASE..=MAX_BASE)
        } else {
            DEFAULT_BASE
        };
        Expr::Number { value, base }
    }

    /// A fully rendered case.
    pub fn case<R: Rng + ?Sized>(&self, rng: &mut R, index: usize) -> ArithmeticCase {
        let expr = self.expr(rng, 0);
        ArithmeticCase {
            index,
            canonical: Canonical.render(&expr),
            subject: SubjectSyntax.render(&expr),
            expr,
        }
    }
}

/// Uniform value in `[0, 10^digits)`.
fn random_decimal<R: Rng + ?Sized>(rng: &mut R, digits: u32) -> BigInt {
    let mut value = BigInt::zero();
    for _ in 0..digits {
        value = value * 10u32 + rng.gen_range(0u32..10);
    }
    value
}

/// Random digit string of length `len` valid in `base`.
fn random_digits<R: Rng + ?Sized>(rng: &mut R, base: u32, len: usize) -> String {
    (0..len)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..base as usize)]))
        .collect()
}

/// Reject trees the generator must never produce: literal bases outside
/// [2, 36], or a division whose right operand is the literal zero.
pub fn check_well_formed(expr: &Expr) -> Result<()> {
    let mut problem = None;
    expr.walk(&mut |node| {
        if problem.is_some() {
            return;
        }
        match node {
            Expr::Number { base, .. } if limbs::check_base(*base).is_err() => {
                problem = Some(format!("literal in unsupported base {base}"));
            }
            Expr::Binary { op, rhs, .. } if op.is_division() => {
                if let Expr::Number { value, .. } = rhs.as_ref() {
                    if value.is_zero() {
                        problem = Some(format!("{op} by literal zero"));
                    }
                }
            }
            _ => {}
        }
    });
    match problem {
        Some(message) => Err(Error::Generation(message)),
        None => Ok(()),
    }
}

/// Lazy stream of arithmetic cases.
#[derive(Debug, Clone)]
pub struct ArithmeticCases {
    generator: ExprGenerator,
    seed: u64,
    rng: StdRng,
    index: usize,
    limit: usize,
}

impl ArithmeticCases {
    pub fn new(config: &GeneratorConfig, seed: u64, limit: usize) -> Result<Self> {
        Ok(Self {
            generator: ExprGenerator::new(config)?,
            seed,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
            limit,
        })
    }

    /// Start over; the same cases come out again.
    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.index = 0;
    }
}

impl Iterator for ArithmeticCases {
    type Item = ArithmeticCase;

    fn next(&mut self) -> Option<ArithmeticCase> {
        if self.index >= self.limit {
            return None;
        }
        let case = self.generator.case(&mut self.rng, self.index);
        self.index += 1;
        Some(case)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.limit - self.index;
        (left, Some(left))
    }
}

/// Builds random numerals for a given base pair.
#[derive(Debug, Clone)]
struct NumeralGenerator {
    max_len: usize,
    decimal_suffix_probability: f64,
}

impl NumeralGenerator {
    fn new(config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_len: config.max_numeral_len,
            decimal_suffix_probability: config.decimal_suffix_probability,
        })
    }

    fn case<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        index: usize,
        source_base: u32,
        target_base: u32,
    ) -> NumeralCase {
        let len = rng.gen_range(1..=self.max_len);
        let digits = random_digits(rng, source_base, len);
        let suffixed =
            source_base != DEFAULT_BASE || rng.gen_bool(self.decimal_suffix_probability);
        NumeralCase {
            index,
            digits,
            source_base,
            target_base,
            suffixed,
        }
    }
}

/// Lazy stream of numerals with uniformly random base pairs (self-pairs
/// included).
#[derive(Debug, Clone)]
pub struct NumeralCases {
    generator: NumeralGenerator,
    seed: u64,
    rng: StdRng,
    index: usize,
    limit: usize,
}

impl NumeralCases {
    pub fn new(config: &GeneratorConfig, seed: u64, limit: usize) -> Result<Self> {
        Ok(Self {
            generator: NumeralGenerator::new(config)?,
            seed,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
            limit,
        })
    }

    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.index = 0;
    }
}

impl Iterator for NumeralCases {
    type Item = NumeralCase;

    fn next(&mut self) -> Option<NumeralCase> {
        if self.index >= self.limit {
            return None;
        }
        let source = self.rng.gen_range(MIN_BASE..=MAX_BASE);
        let target = self.rng.gen_range(MIN_BASE..=MAX_BASE);
        let case = self.generator.case(&mut self.rng, self.index, source, target);
        self.index += 1;
        Some(case)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.limit - self.index;
        (left, Some(left))
    }
}

/// All ordered pairs `(source, target)` of distinct bases, source-major.
pub fn base_pairs() -> impl Iterator<Item = (u32, u32)> {
    limbs::bases().flat_map(|s| limbs::bases().filter(move |t| *t != s).map(move |t| (s, t)))
}

/// Exhaustive sweep over [`base_pairs`], `per_cell` numerals per pair.
#[derive(Debug, Clone)]
pub struct BaseMatrix {
    generator: NumeralGenerator,
    pairs: Vec<(u32, u32)>,
    per_cell: usize,
    seed: u64,
    rng: StdRng,
    index: usize,
}

impl BaseMatrix {
    pub fn new(config: &GeneratorConfig, seed: u64, per_cell: usize) -> Result<Self> {
        if per_cell == 0 {
            return Err(Error::Config("matrix needs at least one case per cell".to_string()));
        }
        Ok(Self {
            generator: NumeralGenerator::new(config)?,
            pairs: base_pairs().collect(),
            per_cell,
            seed,
            rng: StdRng::seed_from_u64(seed),
            index: 0,
        })
    }

    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.index = 0;
    }

    /// Number of cells in the sweep.
    pub fn cells(&self) -> usize {
        self.pairs.len()
    }

    fn total(&self) -> usize {
        self.pairs.len() * self.per_cell
    }
}

impl Iterator for BaseMatrix {
    type Item = NumeralCase;

    fn next(&mut self) -> Option<NumeralCase> {
        let (source, target) = *self.pairs.get(self.index / self.per_cell)?;
        let case = self.generator.case(&mut self.rng, self.index, source, target);
        self.index += 1;
        Some(case)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total() - self.index.min(self.total());
        (left, Some(left))
    }
}
