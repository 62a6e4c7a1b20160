//! Error types for apcfuzz
//!
//! The variants follow how far a failure is allowed to travel:
//! - Per-case failures (`Invocation`, `ResultParse`) are caught by the runner
//!   and turned into tagged verdicts; the run continues.
//! - Generator bugs (`Generation`) and limb-table violations (`Configuration`)
//!   abort the run.
//! - Everything else belongs to oracle input handling, config loading or I/O.

use thiserror::Error;

/// Result type alias using apcfuzz's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// apcfuzz error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The generator produced something it never should. Always a bug.
    #[error("generation error: {0}")]
    Generation(String),

    /// The subject process could not be started or printed nothing.
    #[error("subject invocation failed: {0}")]
    Invocation(String),

    /// The subject ran but its reply did not have the expected shape.
    #[error("malformed subject reply: {message}")]
    ResultParse { message: String, raw: String },

    /// A limb-capacity overflow bound does not hold.
    #[error("configuration invariant violated: {0}")]
    Configuration(String),

    /// Expression text could not be read.
    #[error("parse error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },

    /// Division or remainder with a zero right operand.
    #[error("division by zero")]
    DivisionByZero,

    /// A base outside [2, 36].
    #[error("invalid base: {0}")]
    InvalidBase(u32),

    /// A digit that is not valid in the stated base.
    #[error("invalid digit '{digit}' for base {base}")]
    InvalidDigit { digit: char, base: u32 },

    /// Harness configuration is unusable.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error while reading config or writing reports.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error at a byte offset of the input.
    pub fn parse_at(message: impl Into<String>, offset: usize) -> Self {
        Self::Parse {
            message: message.into(),
            offset,
        }
    }

    /// Create a reply-shape error that keeps the raw subject output.
    pub fn result_parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ResultParse {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Errors that end the whole run rather than a single case.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Configuration(_))
    }
}
