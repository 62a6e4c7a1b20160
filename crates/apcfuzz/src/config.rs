//! Harness configuration
//!
//! Defaults reproduce the original test scripts: the subject lives at
//! `build/apc`, its answer is on the last non-empty output line, and division
//! gets three times the weight of the other operators.
//!
//! Configs can be read from JSON; any omitted field keeps its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::weights::{OperatorWeights, ShapeWeights};

/// Knobs for random case generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Relative odds of leaf, unary and binary nodes.
    pub shape_weights: ShapeWeights,

    /// Relative odds of each binary operator.
    pub operator_weights: OperatorWeights,

    /// Deepest node level; nodes at this depth are always leaves.
    /// Default: 4
    pub max_depth: usize,

    /// Upper bound for the digit-count exponent of a leaf.
    /// Default: 30
    pub max_leaf_digits: u32,

    /// Upper bound for the digit count of a division's right operand.
    /// Default: 4
    pub max_divisor_digits: u32,

    /// Chance that a leaf is negative.
    /// Default: 0.5
    pub negative_probability: f64,

    /// Chance that a unary node gets an extra pair of parentheses.
    /// Default: 0.5
    pub unary_group_probability: f64,

    /// Chance that an arithmetic leaf is written in a random base.
    /// Default: 0.0
    pub based_literal_probability: f64,

    /// Longest numeral in numeral and matrix modes.
    /// Default: 50
    pub max_numeral_len: usize,

    /// Chance that a decimal numeral still carries an explicit `_10`.
    /// Default: 0.5
    pub decimal_suffix_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            shape_weights: ShapeWeights::default(),
            operator_weights: OperatorWeights::default(),
            max_depth: 4,
            max_leaf_digits: 30,
            max_divisor_digits: 4,
            negative_probability: 0.5,
            unary_group_probability: 0.5,
            based_literal_probability: 0.0,
            max_numeral_len: 50,
            decimal_suffix_probability: 0.5,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deepest node level
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the leaf digit-count bound
    pub fn max_leaf_digits(mut self, digits: u32) -> Self {
        self.max_leaf_digits = digits;
        self
    }

    /// Set the divisor digit-count bound
    pub fn max_divisor_digits(mut self, digits: u32) -> Self {
        self.max_divisor_digits = digits;
        self
    }

    pub fn shape_weights(mut self, weights: ShapeWeights) -> Self {
        self.shape_weights = weights;
        self
    }

    pub fn operator_weights(mut self, weights: OperatorWeights) -> Self {
        self.operator_weights = weights;
        self
    }

    pub fn based_literal_probability(mut self, p: f64) -> Self {
        self.based_literal_probability = p;
        self
    }

    pub fn max_numeral_len(mut self, len: usize) -> Self {
        self.max_numeral_len = len;
        self
    }

    /// Reject values the generator cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.shape_weights.table()?;
        self.operator_weights.table()?;
        if self.max_leaf_digits == 0 {
            return Err(Error::Config("max_leaf_digits must be at least 1".to_string()));
        }
        if self.max_divisor_digits == 0 {
            return Err(Error::Config("max_divisor_digits must be at least 1".to_string()));
        }
        if self.max_numeral_len == 0 {
            return Err(Error::Config("max_numeral_len must be at least 1".to_string()));
        }
        for (name, p) in [
            ("negative_probability", self.negative_probability),
            ("unary_group_probability", self.unary_group_probability),
            ("based_literal_probability", self.based_literal_probability),
            ("decimal_suffix_probability", self.decimal_suffix_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Config(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        Ok(())
    }
}

/// Everything a run needs besides the mode, seed and case count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Path of the calculator under test.
    /// Default: build/apc
    pub subject: PathBuf,

    /// Which non-empty output line holds the answer, counted from the end.
    /// Default: 0 (the last line)
    pub result_line_from_end: usize,

    pub generator: GeneratorConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            subject: PathBuf::from("build/apc"),
            result_line_from_end: 0,
            generator: GeneratorConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Read config from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the subject path
    pub fn subject(mut self, path: impl Into<PathBuf>) -> Self {
        self.subject = path.into();
        self
    }

    /// Set the answer line offset
    pub fn result_line_from_end(mut self, offset: usize) -> Self {
        self.result_line_from_end = offset;
        self
    }

    pub fn generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.generator.validate()
    }
}
