//! Subject driver
//!
//! The subject is an opaque executable. Each call spawns it with the
//! expression as its only argument, waits for it to exit, and reads the
//! answer off a fixed line of its standard output:
//!
//! ```text
//! 3 + 4 = 7
//! ```
//!
//! Nothing is cached and no state is carried between calls.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use regex::Regex;

use crate::error::{Error, Result};

const REPLY_PATTERN: &str = r"^[+-]?[0-9A-Za-z]+(?:_[0-9]+)?$";

/// Something that answers expression text with raw output.
pub trait Subject {
    /// Run one expression and return everything printed on stdout.
    fn invoke(&self, input: &str) -> Result<String>;

    /// Short label for logs and reports.
    fn name(&self) -> String;
}

/// An executable on disk.
#[derive(Debug, Clone)]
pub struct ProcessSubject {
    path: PathBuf,
}

impl ProcessSubject {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Subject for ProcessSubject {
    fn invoke(&self, input: &str) -> Result<String> {
        // output() spawns, drains both pipes and reaps the child.
        let output = Command::new(&self.path)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                Error::Invocation(format!("cannot start {}: {e}", self.path.display()))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::trace!(input, stdout = %stdout, status = %output.status, "subject output");

        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Invocation(format!(
                "no output ({}){}",
                output.status,
                if stderr.trim().is_empty() {
                    String::new()
                } else {
                    format!(": {}", stderr.trim())
                }
            )));
        }
        Ok(stdout)
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pulls the answer out of a subject's reply.
#[derive(Debug, Clone)]
pub struct ReplyExtractor {
    line_from_end: usize,
    numeral: Regex,
}

impl ReplyExtractor {
    /// `line_from_end` picks the answer line among non-empty lines: 0 is
    /// the last, 1 the one before it.
    pub fn new(line_from_end: usize) -> Result<Self> {
        let numeral = Regex::new(REPLY_PATTERN).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self {
            line_from_end,
            numeral,
        })
    }

    /// The text after the last `=` on the answer line, if it is a numeral.
    pub fn extract(&self, raw: &str) -> Result<String> {
        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect();

        let line = lines
            .len()
            .checked_sub(self.line_from_end + 1)
            .and_then(|i| lines.get(i))
            .ok_or_else(|| {
                Error::result_parse(
                    format!(
                        "expected at least {} non-empty lines, got {}",
                        self.line_from_end + 1,
                        lines.len()
                    ),
                    raw,
                )
            })?;

        let (_, result) = line
            .rsplit_once('=')
            .ok_or_else(|| Error::result_parse("no '=' on the answer line", raw))?;
        let result = result.trim();

        if !self.numeral.is_match(result) {
            return Err(Error::result_parse(format!("'{result}' is not a numeral"), raw));
        }
        Ok(result.to_string())
    }
}

/// Digits of a conversion reply: everything before the first `_`.
pub fn conversion_digits(reply: &str) -> &str {
    reply.split_once('_').map_or(reply, |(digits, _)| digits)
}

/// A subject paired with the way its answers are read.
pub struct Driver<S> {
    subject: S,
    extractor: ReplyExtractor,
}

impl<S: Subject> Driver<S> {
    pub fn new(subject: S, line_from_end: usize) -> Result<Self> {
        Ok(Self {
            subject,
            extractor: ReplyExtractor::new(line_from_end)?,
        })
    }

    /// Invoke the subject and extract its answer.
    pub fn evaluate(&self, input: &str) -> Result<String> {
        let raw = self.subject.invoke(input)?;
        self.extractor.extract(&raw)
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }
}
