//! Named weight tables
//!
//! Every random choice between variants goes through a [`WeightTable`] keyed
//! by the variant itself, so the odds of a choice are data, not branch order.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::BinaryOp;

/// A finite set of variants with integer weights.
#[derive(Debug, Clone)]
pub struct WeightTable<T> {
    entries: Vec<(T, u32)>,
    total: u32,
}

impl<T: Copy> WeightTable<T> {
    /// Build a table. Zero-weight entries are kept out; at least one entry
    /// must have a positive weight.
    pub fn new(entries: impl IntoIterator<Item = (T, u32)>) -> Result<Self> {
        let entries: Vec<(T, u32)> = entries.into_iter().filter(|(_, w)| *w > 0).collect();
        let total = entries
            .iter()
            .try_fold(0u32, |acc, (_, w)| acc.checked_add(*w))
            .ok_or_else(|| Error::Config("weight table total overflows".to_string()))?;
        if total == 0 {
            return Err(Error::Config("weight table has no positive weight".to_string()));
        }
        Ok(Self { entries, total })
    }

    /// Draw one variant with probability proportional to its weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        let mut ticket = rng.gen_range(0..self.total);
        for (value, weight) in &self.entries {
            if ticket < *weight {
                return *value;
            }
            ticket -= weight;
        }
        // ticket < total, so the loop always returns
        self.entries[self.entries.len() - 1].0
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

/// Node shapes the arithmetic generator chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Leaf,
    Unary,
    Binary,
}

/// Weights for [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeWeights {
    pub leaf: u32,
    pub unary: u32,
    pub binary: u32,
}

impl Default for ShapeWeights {
    fn default() -> Self {
        Self {
            leaf: 2,
            unary: 1,
            binary: 3,
        }
    }
}

impl ShapeWeights {
    pub fn table(&self) -> Result<WeightTable<Shape>> {
        WeightTable::new([
            (Shape::Leaf, self.leaf),
            (Shape::Unary, self.unary),
            (Shape::Binary, self.binary),
        ])
    }
}

/// Weights for [`BinaryOp`]. Skewed toward division by default, where
/// multi-limb code is hardest to get right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorWeights {
    pub add: u32,
    pub sub: u32,
    pub mul: u32,
    pub div: u32,
    #[serde(alias = "mod")]
    pub rem: u32,
}

impl Default for OperatorWeights {
    fn default() -> Self {
        Self {
            add: 1,
            sub: 1,
            mul: 1,
            div: 3,
            rem: 3,
        }
    }
}

impl OperatorWeights {
    pub fn table(&self) -> Result<WeightTable<BinaryOp>> {
        WeightTable::new([
            (BinaryOp::Add, self.add),
            (BinaryOp::Sub, self.sub),
            (BinaryOp::Mul, self.mul),
            (BinaryOp::Div, self.div),
            (BinaryOp::Rem, self.rem),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_weights_are_never_drawn() {
        let table = WeightTable::new([('a', 0), ('b', 5), ('c', 0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(table.sample(&mut rng), 'b');
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(WeightTable::<char>::new([('a', 0)]).is_err());
        assert!(WeightTable::<char>::new([]).is_err());
    }

    #[test]
    fn frequencies_follow_weights() {
        let table = WeightTable::new([(0usize, 1), (1, 3)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 2];
        for _ in 0..8000 {
            counts[table.sample(&mut rng)] += 1;
        }
        // expected 2000 / 6000
        assert!((1700..2300).contains(&counts[0]), "{counts:?}");
        assert!((5700..6300).contains(&counts[1]), "{counts:?}");
    }

    #[test]
    fn default_operator_table_favours_division() {
        let table = OperatorWeights::default().table().unwrap();
        assert_eq!(table.total(), 9);
        let mut rng = StdRng::seed_from_u64(3);
        let draws: Vec<BinaryOp> = (0..9000).map(|_| table.sample(&mut rng)).collect();
        let divisions = draws.iter().filter(|op| op.is_division()).count();
        let additions = draws.iter().filter(|op| **op == BinaryOp::Add).count();
        // expected 6000 / 1000
        assert!((5600..6400).contains(&divisions), "{divisions}");
        assert!((800..1200).contains(&additions), "{additions}");
    }

    #[test]
    fn operator_weights_accept_mod_alias() {
        let w: OperatorWeights = serde_json::from_str(r#"{"mod": 7, "add": 0}"#).unwrap();
        assert_eq!(w.rem, 7);
        assert_eq!(w.add, 0);
        assert_eq!(w.div, 3);
    }
}
