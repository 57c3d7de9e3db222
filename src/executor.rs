//! Execution dispatch: decide who satisfies a command and run it with the
//! requested descriptor wiring.
//!
//! Builtins whose effect must outlive the command (`cd`, `exit`) run in the
//! shell process. Every other builtin runs in a forked child, which is where
//! its redirections are applied; the parent's descriptors are never touched,
//! so one misbehaving command cannot poison the next. External programs get a
//! child that rewires its descriptors and replaces its image.

use crate::builtin::{Builtin, Io, Registry};
use crate::command::{Command, ExitCode, Outcome};
use crate::external;
use crate::redirect::RedirectGuard;
use log::debug;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execv, fork};
use std::ffi::CString;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// How a command will be satisfied.
enum Strategy<'a> {
    /// Builtin whose effect must outlive this command; runs right here.
    InProcess(&'a dyn Builtin),
    /// Any other builtin: a disposable child applies the redirections and
    /// runs the builtin logic.
    InChild(&'a dyn Builtin),
    /// Resolved external program.
    External(PathBuf),
    NotFound,
}

fn classify<'a>(command: &Command, registry: &'a Registry) -> Strategy<'a> {
    if let Some(builtin) = registry.get(command.name()) {
        if builtin.runs_in_parent() {
            Strategy::InProcess(builtin)
        } else {
            Strategy::InChild(builtin)
        }
    } else if let Some(path) = external::resolve_program(command.name()) {
        Strategy::External(path)
    } else {
        Strategy::NotFound
    }
}

/// Run one resolved command to completion and report what it means for the
/// session. Never fatal: every failure mode becomes an [`Outcome`] and the
/// caller reads the next line.
pub fn execute(command: &Command, registry: &Registry) -> Outcome {
    match classify(command, registry) {
        Strategy::InProcess(builtin) => {
            debug!("`{}`: builtin, in process", command.name());
            run_in_process(builtin, command)
        }
        Strategy::InChild(builtin) => {
            debug!("`{}`: builtin, forked", command.name());
            run_forked_builtin(builtin, command)
        }
        Strategy::External(path) => {
            debug!("`{}`: external, {}", command.name(), path.display());
            run_external(&path, command)
        }
        Strategy::NotFound => {
            eprintln!("{}: command not found", command.name());
            Outcome::Code(127)
        }
    }
}

/// In-process builtins get the shell's own streams and no redirections:
/// their output is diagnostic only, and their effect is the point.
fn run_in_process(builtin: &dyn Builtin, command: &Command) -> Outcome {
    let result = builtin.run(
        command.args(),
        &mut Io {
            stdout: &mut std::io::stdout(),
            stderr: &mut std::io::stderr(),
        },
    );
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}: {:#}", command.name(), e);
            Outcome::Code(1)
        }
    }
}

fn run_forked_builtin(builtin: &dyn Builtin, command: &Command) -> Outcome {
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let code = forked_builtin_body(builtin, command);
            std::process::exit(code)
        }
        Ok(ForkResult::Parent { child }) => wait_for(child),
        Err(e) => {
            eprintln!("{}: cannot spawn: {}", command.name(), e);
            Outcome::Code(1)
        }
    }
}

/// Everything the child does between fork and exit. The guard is dropped
/// before returning, so even here descriptors go back deterministically.
fn forked_builtin_body(builtin: &dyn Builtin, command: &Command) -> ExitCode {
    let _guard = match RedirectGuard::acquire(&command.redirections) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}: {:#}", command.name(), e);
            return 1;
        }
    };
    let result = builtin.run(
        command.args(),
        &mut Io {
            stdout: &mut std::io::stdout(),
            stderr: &mut std::io::stderr(),
        },
    );
    match result {
        Ok(outcome) => outcome.code(),
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "{}: {:#}", command.name(), e);
            1
        }
    }
}

fn run_external(path: &Path, command: &Command) -> Outcome {
    // Prepare the exec arguments before forking so conversion failures
    // surface in the parent.
    let program = match CString::new(path.as_os_str().as_bytes()) {
        Ok(s) => s,
        Err(_) => {
            eprintln!("{}: invalid program path", command.name());
            return Outcome::Code(1);
        }
    };
    let argv: Vec<CString> = match command
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect()
    {
        Ok(argv) => argv,
        Err(_) => {
            eprintln!("{}: argument contains NUL", command.name());
            return Outcome::Code(1);
        }
    };

    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            match RedirectGuard::acquire(&command.redirections) {
                Ok(guard) => guard.persist(),
                Err(e) => {
                    eprintln!("{}: {:#}", command.name(), e);
                    std::process::exit(1)
                }
            }
            // Only returns on failure; the report lands on whatever stderr
            // is wired to by now, exactly like a shell.
            match execv(&program, &argv) {
                Ok(never) => match never {},
                Err(e) => {
                    let _ = writeln!(std::io::stderr(), "{}: {}", command.name(), e);
                    std::process::exit(126)
                }
            }
        }
        Ok(ForkResult::Parent { child }) => wait_for(child),
        Err(e) => {
            eprintln!("{}: cannot spawn: {}", command.name(), e);
            Outcome::Code(1)
        }
    }
}

fn wait_for(child: Pid) -> Outcome {
    match waitpid(child, None) {
        Ok(WaitStatus::Exited(_, code)) => Outcome::Code(code),
        Ok(WaitStatus::Signaled(_, signal, _)) => Outcome::Code(128 + signal as i32),
        Ok(status) => {
            debug!("unexpected wait status: {status:?}");
            Outcome::Code(1)
        }
        Err(e) => {
            eprintln!("wait failed: {e}");
            Outcome::Code(1)
        }
    }
}
