//! Interactive front end
//!
//! Uses rustyline (history, line editing) when stdin is a terminal and the
//! `interactive` feature is on; otherwise reads plain lines from stdin.

use anyhow::{Context, Result};
use apcfuzz::session::{self, BufReadSource};
use apcfuzz::{Driver, HarnessConfig, ProcessSubject};
use colored::Colorize;

pub fn run(config: &HarnessConfig) -> Result<()> {
    let driver = Driver::new(
        ProcessSubject::new(&config.subject),
        config.result_line_from_end,
    )
    .context("Failed to set up subject driver")?;

    eprintln!(
        "{} {} against the oracle; type {} or {} to leave",
        "Comparing".bold().green(),
        config.subject.display(),
        "q".bold(),
        "quit".bold()
    );

    let mut out = std::io::stdout();

    #[cfg(feature = "interactive")]
    {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            let mut source = editor::EditorSource::new().context("Failed to start line editor")?;
            let evaluated = session::run_session(&mut source, &driver, &mut out)?;
            tracing::info!(evaluated, "session ended");
            return Ok(());
        }
    }

    let stdin = std::io::stdin();
    let mut source = BufReadSource::new(stdin.lock(), std::io::stdout());
    let evaluated = session::run_session(&mut source, &driver, &mut out)?;
    tracing::info!(evaluated, "session ended");
    Ok(())
}

#[cfg(feature = "interactive")]
mod editor {
    use apcfuzz::session::LineSource;
    use rustyline::DefaultEditor;
    use rustyline::error::ReadlineError;

    /// rustyline-backed line source with in-memory history.
    pub struct EditorSource {
        editor: DefaultEditor,
    }

    impl EditorSource {
        pub fn new() -> Result<Self, ReadlineError> {
            Ok(Self {
                editor: DefaultEditor::new()?,
            })
        }
    }

    impl LineSource for EditorSource {
        fn read_line(&mut self, prompt: &str) -> apcfuzz::Result<Option<String>> {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    Ok(Some(line))
                }
                // Ctrl-D and Ctrl-C both end the session
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
                Err(ReadlineError::Io(e)) => Err(e.into()),
                Err(e) => Err(std::io::Error::other(e.to_string()).into()),
            }
        }
    }
}
