//! Interactive session
//!
//! Reads one expression per line, sends it to the subject as typed, and
//! reports immediately whether the subject agrees with the oracle. `q` or
//! `quit` (or end of input) ends the session. Nothing is aggregated.

use std::io::{BufRead, Write};

use crate::compare::{self, Verdict};
use crate::driver::{Driver, Subject};
use crate::error::Result;
use crate::parser;

/// Prompt shown before each line.
pub const PROMPT: &str = "?= ";

/// Where session lines come from.
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Plain line reader that echoes the prompt to `prompt_out`.
pub struct BufReadSource<R, W> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> BufReadSource<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineSource for BufReadSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.prompt_out, "{prompt}")?;
        self.prompt_out.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

/// Result of one typed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// Both sides produced `value`.
    Agreement { value: String },
    /// The subject answered, differently.
    Disagreement { subject: String, oracle: String },
    /// The subject gave no usable answer.
    SubjectFailure { message: String, oracle: String },
    /// The oracle rejected the line; the subject was not asked.
    OracleError { message: String },
}

impl Exchange {
    fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        match self {
            Exchange::Agreement { value } => writeln!(out, "correct: \"{value}\""),
            Exchange::Disagreement { subject, oracle } => {
                writeln!(out, "subject: \"{subject}\"")?;
                writeln!(out, "oracle: \"{oracle}\"")
            }
            Exchange::SubjectFailure { message, oracle } => {
                writeln!(out, "subject: <{message}>")?;
                writeln!(out, "oracle: \"{oracle}\"")
            }
            Exchange::OracleError { message } => writeln!(out, "oracle error: {message}"),
        }
    }
}

/// Is `line` a request to leave?
pub fn is_sentinel(line: &str) -> bool {
    matches!(line.trim(), "q" | "quit")
}

/// Evaluate one line on both sides.
pub fn exchange<S: Subject>(driver: &Driver<S>, line: &str) -> Exchange {
    let query = match parser::parse_query(line) {
        Ok(query) => query,
        Err(e) => {
            return Exchange::OracleError {
                message: e.to_string(),
            };
        }
    };
    let expected = match query.evaluate() {
        Ok(expected) => expected,
        Err(e) => {
            return Exchange::OracleError {
                message: e.to_string(),
            };
        }
    };

    let reply = driver.evaluate(line.trim());
    let (actual, verdict) = if query.target_base.is_some() {
        compare::judge_conversion(&expected, reply)
    } else {
        compare::judge_arithmetic(&expected, reply)
    };

    match verdict {
        Verdict::Pass => Exchange::Agreement { value: expected },
        Verdict::Mismatch => Exchange::Disagreement {
            subject: actual.unwrap_or_default(),
            oracle: expected,
        },
        Verdict::InvocationFailed { message } => Exchange::SubjectFailure {
            message: format!("invocation error: {message}"),
            oracle: expected,
        },
        Verdict::MalformedReply { message, .. } => Exchange::SubjectFailure {
            message: format!("malformed reply: {message}"),
            oracle: expected,
        },
    }
}

/// Run until a sentinel or end of input. Returns how many lines were
/// evaluated.
pub fn run_session<S: Subject>(
    source: &mut impl LineSource,
    driver: &Driver<S>,
    out: &mut impl Write,
) -> Result<usize> {
    let mut evaluated = 0;
    while let Some(line) = source.read_line(PROMPT)? {
        if line.trim().is_empty() {
            continue;
        }
        if is_sentinel(&line) {
            break;
        }
        let result = exchange(driver, &line);
        tracing::debug!(line = %line, ?result, "interactive line");
        result.write_to(out)?;
        out.flush()?;
        evaluated += 1;
    }
    Ok(evaluated)
}
