//! A small interactive shell core.
//!
//! One line of input flows through [`lexer`] (quote-aware tokens), through
//! [`parser`] (redirections split away from `argv`), and into [`executor`],
//! which decides whether the [`builtin`] registry or an external program
//! satisfies the command and wires its file descriptors accordingly. Line
//! input sits behind [`input::LineSource`], so the same [`repl::Session`]
//! drives a terminal, a script, or a test buffer.
//!
//! Nothing here is fatal to a session except an explicit `exit`: every
//! failure is reported at the command boundary and the next line is read
//! with the shell's own streams untouched.

pub mod builtin;
pub mod command;
pub mod completion;
pub mod executor;
pub mod external;
pub mod input;
pub mod lexer;
pub mod parser;
pub mod redirect;
pub mod repl;

#[cfg(test)]
pub(crate) mod test_support;

pub use command::{Command, ExitCode, Outcome};
pub use repl::Session;
