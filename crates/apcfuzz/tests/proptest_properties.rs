//! Property-based tests for the oracle, the renderers and the limb table

mod common;

use apcfuzz::generate::ExprGenerator;
use apcfuzz::{Driver, GeneratorConfig, compare, limbs, oracle, parser};
use common::StubSubject;
use num_bigint::{BigInt, BigUint};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config() -> GeneratorConfig {
    GeneratorConfig::default().based_literal_probability(0.4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Rendering in any base and reading back gives the same value
    #[test]
    fn conversion_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..24), base in 2u32..=36) {
        let n = BigInt::from(BigUint::from_bytes_le(&bytes));
        let rendered = oracle::render_numeral(&n, base).unwrap();
        prop_assert_eq!(oracle::convert(&rendered, base, 10).unwrap(), n.to_string());
        prop_assert_eq!(oracle::parse_numeral(&rendered.to_uppercase(), base).unwrap(), n);
    }

    /// Both renderings of a generated tree denote the tree's value
    #[test]
    fn renderings_agree(seed in any::<u64>()) {
        let generator = ExprGenerator::new(&config()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let case = generator.case(&mut rng, 0);
        let expected = oracle::evaluate(&case.expr).unwrap();

        let canonical = parser::parse_expr(&case.canonical).unwrap();
        prop_assert_eq!(oracle::evaluate(&canonical).unwrap(), expected.clone(), "{}", case.canonical);

        let subject = parser::parse_expr(&case.subject).unwrap();
        prop_assert_eq!(oracle::evaluate(&subject).unwrap(), expected, "{}", case.subject);
    }

    /// A subject that evaluates the subject form correctly always passes
    #[test]
    fn subject_form_equivalence(seed in any::<u64>()) {
        let generator = ExprGenerator::new(&config()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let case = generator.case(&mut rng, 0);
        let expected = oracle::decimal(&oracle::evaluate(&case.expr).unwrap());

        let driver = Driver::new(StubSubject::new(), 0).unwrap();
        let (actual, verdict) = compare::judge_arithmetic(&expected, driver.evaluate(&case.subject));
        prop_assert!(verdict.is_pass(), "{} -> {:?}, expected {}", case.subject, actual, expected);
    }

    /// Truncating division identity
    #[test]
    fn division_identity(a in any::<i64>(), b in any::<i64>().prop_filter("non-zero", |b| *b != 0)) {
        let (a, b) = (BigInt::from(a), BigInt::from(b));
        let q = oracle::apply(apcfuzz::BinaryOp::Div, &a, &b).unwrap();
        let r = oracle::apply(apcfuzz::BinaryOp::Rem, &a, &b).unwrap();
        prop_assert_eq!(&q * &b + &r, a.clone());
        prop_assert!(r.magnitude() < b.magnitude());
        prop_assert!(r == BigInt::from(0) || (r < BigInt::from(0)) == (a < BigInt::from(0)));
    }

    /// Any sum of limb-sized values fits the wide accumulator
    #[test]
    fn limb_sums_fit(x in any::<u32>(), y in any::<u32>(), z in any::<u32>()) {
        prop_assert!(limbs::fits_in_wide(x, y, z));
    }
}

#[test]
fn all_triples_checked() {
    let table = limbs::width_table().unwrap();
    assert_eq!(limbs::verify_limb_table(&table).unwrap(), 35 * 35 * 35);
}
