//! Where command lines come from.
//!
//! The core never reads the terminal itself: it consumes complete lines from
//! a [`LineSource`], so the same session logic runs against an interactive
//! editor, a script, or a test buffer.

use crate::completion::ShellHelper;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::io::BufRead;

pub trait LineSource {
    /// The next complete line without its trailing newline, or `None` at end
    /// of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive line editor with history and tab completion of command names.
pub struct Editor {
    inner: rustyline::Editor<ShellHelper, DefaultHistory>,
}

impl Editor {
    pub fn new(builtins: Vec<String>) -> Result<Self> {
        let mut inner: rustyline::Editor<ShellHelper, DefaultHistory> = rustyline::Editor::new()?;
        inner.set_helper(Some(ShellHelper::new(builtins)));
        Ok(Editor { inner })
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.inner.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.inner.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl-C abandons the current line, not the session.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lines from any buffered reader: scripts, pipes, tests. The prompt is
/// ignored.
pub struct Script<R> {
    reader: R,
}

impl<R: BufRead> Script<R> {
    pub fn new(reader: R) -> Self {
        Script { reader }
    }
}

impl<R: BufRead> LineSource for Script<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}
