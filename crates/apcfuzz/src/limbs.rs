//! Packed-digit width table
//!
//! A multi-limb big integer in base `b` stores `n` base-`b` digits per 32-bit
//! limb, where `b^n` is the largest power of `b` that fits in a `u32`. The
//! limb then behaves like a single digit of base `b^n` (the "limb capacity").
//!
//! Multiply-accumulate, long division and base conversion all compute
//! `x + y * z` on limb values in 64-bit scratch space, so that sum has to fit
//! in a `u64` for every combination of bases. [`verify_limb_table`] checks
//! this over all 35³ ordered triples before a run starts.

use serde::Serialize;

use crate::error::{Error, Result};

/// Smallest supported numeral base.
pub const MIN_BASE: u32 = 2;

/// Largest supported numeral base.
pub const MAX_BASE: u32 = 36;

/// Base the subject assumes when a numeral carries no `_<base>` suffix.
pub const DEFAULT_BASE: u32 = 10;

const LIMB_MAX: u64 = u32::MAX as u64;
const WIDE_MAX: u128 = u64::MAX as u128;

/// One row of the width table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitWidthEntry {
    pub base: u32,
    /// Number of base-`base` digits packed into one limb.
    pub max_exponent: u32,
    /// `base^max_exponent`, the radix of a packed limb.
    pub limb_capacity: u32,
}

/// All bases in [`MIN_BASE`, `MAX_BASE`].
pub fn bases() -> std::ops::RangeInclusive<u32> {
    MIN_BASE..=MAX_BASE
}

/// Check that `base` is in [2, 36].
pub fn check_base(base: u32) -> Result<u32> {
    if bases().contains(&base) {
        Ok(base)
    } else {
        Err(Error::InvalidBase(base))
    }
}

/// Compute the width entry for a single base.
///
/// Probing runs in `u64` so the step past the limit can be observed without
/// wrapping.
pub fn width_entry(base: u32) -> Result<DigitWidthEntry> {
    check_base(base)?;
    let b = u64::from(base);
    let mut power = b;
    let mut exponent = 1;
    while power * b <= LIMB_MAX {
        power *= b;
        exponent += 1;
    }
    let limb_capacity = u32::try_from(power)
        .map_err(|_| Error::Configuration(format!("base {base}: capacity {power} exceeds u32")))?;
    Ok(DigitWidthEntry {
        base,
        max_exponent: exponent,
        limb_capacity,
    })
}

/// The full table, ordered by base.
pub fn width_table() -> Result<Vec<DigitWidthEntry>> {
    bases().map(width_entry).collect()
}

/// Check the single-entry invariants: the capacity fits in a limb, it is the
/// stated power of the base, and one more digit would not fit.
pub fn check_entry(entry: &DigitWidthEntry) -> Result<()> {
    let b = u128::from(entry.base);
    let capacity = u128::from(entry.limb_capacity);
    let limb_max = u128::from(LIMB_MAX);

    if b.checked_pow(entry.max_exponent) != Some(capacity) {
        return Err(Error::Configuration(format!(
            "base {}: capacity {} is not {}^{}",
            entry.base, entry.limb_capacity, entry.base, entry.max_exponent
        )));
    }
    if capacity > limb_max {
        return Err(Error::Configuration(format!(
            "base {}: capacity {} exceeds 2^32-1",
            entry.base, entry.limb_capacity
        )));
    }
    if capacity * b <= limb_max {
        return Err(Error::Configuration(format!(
            "base {}: capacity {} is not maximal",
            entry.base, entry.limb_capacity
        )));
    }
    Ok(())
}

/// Does `x + y * z` fit in a `u64`?
pub fn fits_in_wide(x: u32, y: u32, z: u32) -> bool {
    u128::from(x) + u128::from(y) * u128::from(z) <= WIDE_MAX
}

/// Verify every entry and every ordered triple `(b0, b1, b2)` of the table.
///
/// Returns the number of triples checked. Any violation is a fatal
/// configuration error.
pub fn verify_limb_table(table: &[DigitWidthEntry]) -> Result<usize> {
    for entry in table {
        check_entry(entry)?;
    }

    let mut checked = 0;
    for e0 in table {
        for e1 in table {
            for e2 in table {
                if !fits_in_wide(e0.limb_capacity, e1.limb_capacity, e2.limb_capacity) {
                    return Err(Error::Configuration(format!(
                        "{} + {} * {} overflows u64 (bases {}, {}, {})",
                        e0.limb_capacity,
                        e1.limb_capacity,
                        e2.limb_capacity,
                        e0.base,
                        e1.base,
                        e2.base
                    )));
                }
                checked += 1;
            }
        }
    }

    tracing::debug!(entries = table.len(), triples = checked, "limb table verified");
    Ok(checked)
}

/// Build and verify the table in one step. Runs before any fuzzing.
pub fn verified_table() -> Result<Vec<DigitWidthEntry>> {
    let table = width_table()?;
    verify_limb_table(&table)?;
    Ok(table)
}

/// Render the table as a lookup-table initializer, one base per line.
pub fn render_table(table: &[DigitWidthEntry]) -> String {
    let mut out = String::from("base_lookup_table = {\n");
    for entry in table {
        out.push_str(&format!(
            "\t[{}] = {{{}, {}}},\n",
            entry.base, entry.max_exponent, entry.limb_capacity
        ));
    }
    out.push_str("};\n");
    out
}
