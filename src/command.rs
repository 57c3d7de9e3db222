//! Data contracts passed between the lexer, the resolver and the dispatcher.

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Which standard stream a redirection rewires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTarget {
    Stdout,
    Stderr,
}

impl StreamTarget {
    /// The file descriptor slot this stream occupies.
    pub fn fd(self) -> i32 {
        match self {
            StreamTarget::Stdout => 1,
            StreamTarget::Stderr => 2,
        }
    }
}

/// Whether the target file is truncated or appended to on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Truncate,
    Append,
}

/// A declared remapping of stdout or stderr to a file.
///
/// Nothing is opened until execution time; this is pure intent. A command
/// carries its redirections in source order, and applying them in that order
/// makes a later redirection for the same stream win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub target: StreamTarget,
    pub path: String,
    pub mode: RedirectMode,
}

/// One fully resolved command line: program name plus arguments, and the
/// redirections stripped out of the token stream.
///
/// `argv` is non-empty by construction: the resolver refuses to build a
/// `Command` without at least a program name. Each instance lives for exactly
/// one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub argv: Vec<String>,
    pub redirections: Vec<Redirection>,
}

impl Command {
    /// The program or builtin name.
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// What a finished command means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran (or failed); the session reads the next line.
    Code(ExitCode),
    /// `exit` ran; the session terminates with this status.
    Exit(ExitCode),
}

impl Outcome {
    /// The exit code regardless of whether the session continues.
    pub fn code(self) -> ExitCode {
        match self {
            Outcome::Code(c) | Outcome::Exit(c) => c,
        }
    }
}
