//! The session loop: read a line, evaluate it, repeat until `exit` or end of
//! input. One command runs to completion before the next line is read, so the
//! effects of command N are visible to command N+1.

use crate::builtin::Registry;
use crate::command::{ExitCode, Outcome};
use crate::executor;
use crate::input::LineSource;
use crate::{lexer, parser};
use anyhow::Result;
use log::debug;

pub const PROMPT: &str = "$ ";

pub struct Session<S> {
    source: S,
    registry: Registry,
}

impl<S: LineSource> Session<S> {
    pub fn new(source: S) -> Self {
        Session {
            source,
            registry: Registry::default(),
        }
    }

    pub fn with_registry(source: S, registry: Registry) -> Self {
        Session { source, registry }
    }

    /// Run until `exit` or until the line source dries up (status 0).
    pub fn run(&mut self) -> Result<ExitCode> {
        loop {
            let Some(line) = self.source.read_line(PROMPT)? else {
                return Ok(0);
            };
            if let Outcome::Exit(code) = self.eval(&line) {
                return Ok(code);
            }
        }
    }

    /// Evaluate one line. Blank lines and lines that resolve to nothing are
    /// absorbed as success.
    pub fn eval(&self, line: &str) -> Outcome {
        let tokens = lexer::tokenize(line);
        debug!("tokens: {tokens:?}");
        let Some(command) = parser::resolve(tokens) else {
            return Outcome::Code(0);
        };
        debug!("resolved: {command:?}");
        executor::execute(&command, &self.registry)
    }
}
