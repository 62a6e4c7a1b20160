//! apcfuzz - Differential testing for an arbitrary-precision calculator
//!
//! Random expressions and numerals are rendered twice, once for a trusted
//! big-integer oracle and once for the calculator under test. The calculator
//! runs as a separate process per case; its answers are compared with the
//! oracle's and tallied by operation kind and base pair.
//!
//! # Example
//!
//! ```rust,no_run
//! use apcfuzz::{Harness, HarnessConfig, ProcessSubject};
//!
//! fn main() -> apcfuzz::Result<()> {
//!     let config = HarnessConfig::default();
//!     let harness = Harness::new(ProcessSubject::new(&config.subject), &config)?;
//!     let outcome = harness.run_arithmetic(42, 1000, |_| {})?;
//!     println!("{}", outcome.statistics.overall);
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod config;
pub mod driver;
mod error;
pub mod expr;
pub mod generate;
pub mod limbs;
pub mod oracle;
pub mod parser;
pub mod report;
pub mod runner;
pub mod session;
pub mod weights;

pub use compare::{CaseReport, FailureTag, Mode, RunStatistics, Tally, Verdict};
pub use config::{GeneratorConfig, HarnessConfig};
pub use driver::{Driver, ProcessSubject, Subject};
pub use error::{Error, Result};
pub use expr::{BinaryOp, Canonical, Expr, Renderer, SubjectSyntax, UnaryOp};
pub use runner::{Harness, RunOutcome};
