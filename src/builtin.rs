//! Commands the shell satisfies itself, behind a single registration table.
//!
//! Each builtin implements [`Builtin`] and is added to the [`Registry`] by
//! registering it; dispatch never grows another `if`/`else` chain. Builtins
//! write to an [`Io`] pair and never touch descriptors themselves; deciding
//! what stdout/stderr reference is the dispatcher's job.

use crate::command::{ExitCode, Outcome};
use crate::external;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// The streams a builtin writes to: the process's current stdout/stderr in
/// real use, capture buffers in tests.
pub struct Io<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

pub trait Builtin {
    /// Canonical command name, e.g. "echo".
    fn name(&self) -> &'static str;

    /// True for builtins whose effect must outlive the command; the
    /// dispatcher runs those in the shell process instead of a child.
    fn runs_in_parent(&self) -> bool {
        false
    }

    /// Execute with `argv[1..]`.
    ///
    /// Expected failures (a missing file, an unreachable directory) are
    /// reported on `io.stderr` and become a non-zero [`Outcome`]; `Err` is
    /// reserved for faults in the streams themselves.
    fn run(&self, args: &[String], io: &mut Io<'_>) -> Result<Outcome>;
}

/// Name → implementation table.
pub struct Registry {
    commands: BTreeMap<&'static str, Box<dyn Builtin>>,
}

impl Registry {
    /// A table with nothing registered; embedders build their own set.
    pub fn empty() -> Self {
        Registry {
            commands: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, builtin: Box<dyn Builtin>) {
        self.commands.insert(builtin.name(), builtin);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.commands.get(name).map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }
}

impl Default for Registry {
    /// The standard set: `cat`, `cd`, `echo`, `exit`, `pwd`, `type`.
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry.register(Box::new(Echo));
        registry.register(Box::new(Pwd));
        registry.register(Box::new(Cd));
        registry.register(Box::new(Exit));
        registry.register(Box::new(Cat));

        // `type` needs the final name set, itself included.
        let mut known: Vec<String> = registry.names().iter().map(|s| s.to_string()).collect();
        known.push("type".to_string());
        known.sort();
        registry.register(Box::new(Type { known }));
        registry
    }
}

/// `echo args...`: arguments joined by single spaces plus a newline.
/// Quoting and escapes were already decoded by the lexer, so single-quoted
/// segments arrive here literally.
pub struct Echo;

impl Builtin for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn run(&self, args: &[String], io: &mut Io<'_>) -> Result<Outcome> {
        writeln!(io.stdout, "{}", args.join(" "))?;
        Ok(Outcome::Code(0))
    }
}

/// `pwd`: the current working directory.
pub struct Pwd;

impl Builtin for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn run(&self, _args: &[String], io: &mut Io<'_>) -> Result<Outcome> {
        match std::env::current_dir() {
            Ok(dir) => {
                writeln!(io.stdout, "{}", dir.display())?;
                Ok(Outcome::Code(0))
            }
            Err(e) => {
                writeln!(io.stderr, "pwd: {e}")?;
                Ok(Outcome::Code(1))
            }
        }
    }
}

/// `cd [path]`: change the process working directory.
///
/// The working directory is deliberately left as process-global OS state;
/// this is the one builtin allowed to touch it, and the reason it runs in the
/// shell process rather than a child.
pub struct Cd;

impl Cd {
    fn home_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(PathBuf::from)
    }

    fn missing_home(io: &mut Io<'_>) -> Result<Outcome> {
        writeln!(io.stderr, "cd: HOME not set")?;
        Ok(Outcome::Code(1))
    }
}

impl Builtin for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn runs_in_parent(&self) -> bool {
        true
    }

    fn run(&self, args: &[String], io: &mut Io<'_>) -> Result<Outcome> {
        let target = match args.first().map(String::as_str) {
            None | Some("~") => match Self::home_dir() {
                Some(home) => home,
                None => return Self::missing_home(io),
            },
            // Only a leading `~/` expands; `~user` and interior tildes are
            // ordinary path characters.
            Some(path) if path.starts_with("~/") => match Self::home_dir() {
                Some(home) => home.join(&path[2..]),
                None => return Self::missing_home(io),
            },
            Some(path) => PathBuf::from(path),
        };

        if let Err(e) = std::env::set_current_dir(&target) {
            writeln!(io.stderr, "cd: {}: {}", target.display(), e)?;
            return Ok(Outcome::Code(1));
        }
        Ok(Outcome::Code(0))
    }
}

/// `type name`: how a name would be satisfied.
pub struct Type {
    known: Vec<String>,
}

impl Builtin for Type {
    fn name(&self) -> &'static str {
        "type"
    }

    fn run(&self, args: &[String], io: &mut Io<'_>) -> Result<Outcome> {
        let Some(name) = args.first() else {
            writeln!(io.stderr, "type: missing argument")?;
            return Ok(Outcome::Code(1));
        };

        if self.known.iter().any(|k| k == name) {
            writeln!(io.stdout, "{name} is a shell builtin")?;
        } else if let Some(path) = external::resolve_program(name) {
            writeln!(io.stdout, "{} is {}", name, path.display())?;
        } else {
            writeln!(io.stdout, "{name}: not found")?;
            return Ok(Outcome::Code(1));
        }
        Ok(Outcome::Code(0))
    }
}

/// `exit [code]`: end the session, default status 0.
pub struct Exit;

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn runs_in_parent(&self) -> bool {
        true
    }

    fn run(&self, args: &[String], io: &mut Io<'_>) -> Result<Outcome> {
        match args.first() {
            None => Ok(Outcome::Exit(0)),
            Some(arg) => match arg.parse::<ExitCode>() {
                Ok(code) => Ok(Outcome::Exit(code)),
                Err(_) => {
                    writeln!(io.stderr, "exit: {arg}: numeric argument required")?;
                    Ok(Outcome::Code(1))
                }
            },
        }
    }
}

/// `cat files...`: file contents concatenated in argument order. A missing
/// file is reported and the remaining files are still written.
pub struct Cat;

impl Builtin for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn run(&self, args: &[String], io: &mut Io<'_>) -> Result<Outcome> {
        let mut failed = false;
        for path in args {
            match File::open(path) {
                Ok(mut file) => {
                    std::io::copy(&mut file, io.stdout)?;
                }
                Err(_) => {
                    writeln!(io.stderr, "cat: {path}: No such file or directory")?;
                    failed = true;
                }
            }
        }
        Ok(Outcome::Code(if failed { 1 } else { 0 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_current_dir;
    use std::env as stdenv;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn run_builtin(builtin: &dyn Builtin, args: &[&str]) -> (Outcome, String, String) {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = builtin
            .run(
                &args,
                &mut Io {
                    stdout: &mut out,
                    stderr: &mut err,
                },
            )
            .unwrap();
        (
            outcome,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = stdenv::temp_dir().join(format!(
            "minishell_builtin_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn registry_holds_the_standard_set() {
        let registry = Registry::default();
        assert_eq!(
            registry.names(),
            vec!["cat", "cd", "echo", "exit", "pwd", "type"]
        );
        assert!(registry.contains("echo"));
        assert!(!registry.contains("ls"));
    }

    #[test]
    fn only_session_affecting_builtins_run_in_parent() {
        let registry = Registry::default();
        for name in ["cd", "exit"] {
            assert!(registry.get(name).unwrap().runs_in_parent(), "{name}");
        }
        for name in ["echo", "pwd", "type", "cat"] {
            assert!(!registry.get(name).unwrap().runs_in_parent(), "{name}");
        }
    }

    #[test]
    fn echo_joins_arguments_with_single_spaces() {
        let (outcome, out, err) = run_builtin(&Echo, &["hello", "world"]);
        assert_eq!(outcome, Outcome::Code(0));
        assert_eq!(out, "hello world\n");
        assert!(err.is_empty());
    }

    #[test]
    fn echo_without_arguments_prints_a_bare_newline() {
        let (_, out, _) = run_builtin(&Echo, &[]);
        assert_eq!(out, "\n");
    }

    #[test]
    fn pwd_prints_the_current_directory() {
        let _lock = lock_current_dir();
        let cur = stdenv::current_dir().unwrap();
        let (outcome, out, _) = run_builtin(&Pwd, &[]);
        assert_eq!(outcome, Outcome::Code(0));
        assert_eq!(out, format!("{}\n", cur.display()));
    }

    #[test]
    fn cd_changes_the_working_directory() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = make_unique_temp_dir("cd_abs");
        let canonical = fs::canonicalize(&temp).unwrap();

        let (outcome, _, err) = run_builtin(&Cd, &[&canonical.to_string_lossy()]);
        assert_eq!(outcome, Outcome::Code(0));
        assert!(err.is_empty());
        assert_eq!(stdenv::current_dir().unwrap(), canonical);

        stdenv::set_current_dir(&orig).unwrap();
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn cd_without_argument_goes_home() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = make_unique_temp_dir("cd_home");
        let canonical = fs::canonicalize(&temp).unwrap();
        let saved_home = stdenv::var_os("HOME");
        unsafe { stdenv::set_var("HOME", &canonical) };

        let (outcome, _, _) = run_builtin(&Cd, &[]);
        assert_eq!(outcome, Outcome::Code(0));
        assert_eq!(stdenv::current_dir().unwrap(), canonical);

        let (outcome, _, _) = run_builtin(&Cd, &["~"]);
        assert_eq!(outcome, Outcome::Code(0));
        assert_eq!(stdenv::current_dir().unwrap(), canonical);

        match saved_home {
            Some(home) => unsafe { stdenv::set_var("HOME", home) },
            None => unsafe { stdenv::remove_var("HOME") },
        }
        stdenv::set_current_dir(&orig).unwrap();
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn cd_expands_a_leading_tilde_slash() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = make_unique_temp_dir("cd_tilde");
        fs::create_dir_all(temp.join("sub")).unwrap();
        let canonical = fs::canonicalize(&temp).unwrap();
        let saved_home = stdenv::var_os("HOME");
        unsafe { stdenv::set_var("HOME", &canonical) };

        let (outcome, _, _) = run_builtin(&Cd, &["~/sub"]);
        assert_eq!(outcome, Outcome::Code(0));
        assert_eq!(stdenv::current_dir().unwrap(), canonical.join("sub"));

        match saved_home {
            Some(home) => unsafe { stdenv::set_var("HOME", home) },
            None => unsafe { stdenv::remove_var("HOME") },
        }
        stdenv::set_current_dir(&orig).unwrap();
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn cd_failure_reports_and_leaves_cwd_alone() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let (outcome, _, err) = run_builtin(&Cd, &["/definitely_not_a_dir_xyz"]);
        assert_eq!(outcome, Outcome::Code(1));
        assert!(err.starts_with("cd: /definitely_not_a_dir_xyz: "));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn type_reports_builtins_externals_and_unknowns() {
        let registry = Registry::default();
        let typ = registry.get("type").unwrap();

        let (outcome, out, _) = run_builtin(typ, &["cd"]);
        assert_eq!(outcome, Outcome::Code(0));
        assert_eq!(out, "cd is a shell builtin\n");

        let (_, out, _) = run_builtin(typ, &["type"]);
        assert_eq!(out, "type is a shell builtin\n");

        let (outcome, out, _) = run_builtin(typ, &["sh"]);
        assert_eq!(outcome, Outcome::Code(0));
        assert!(out.starts_with("sh is /"));

        let (outcome, out, _) = run_builtin(typ, &["nonexistent_cmd_xyz"]);
        assert_eq!(outcome, Outcome::Code(1));
        assert_eq!(out, "nonexistent_cmd_xyz: not found\n");
    }

    #[test]
    fn type_without_operand_is_an_error() {
        let registry = Registry::default();
        let (outcome, _, err) = run_builtin(registry.get("type").unwrap(), &[]);
        assert_eq!(outcome, Outcome::Code(1));
        assert_eq!(err, "type: missing argument\n");
    }

    #[test]
    fn exit_carries_its_code() {
        let (outcome, _, _) = run_builtin(&Exit, &[]);
        assert_eq!(outcome, Outcome::Exit(0));
        let (outcome, _, _) = run_builtin(&Exit, &["7"]);
        assert_eq!(outcome, Outcome::Exit(7));
    }

    #[test]
    fn exit_with_junk_keeps_the_session() {
        let (outcome, _, err) = run_builtin(&Exit, &["abc"]);
        assert_eq!(outcome, Outcome::Code(1));
        assert_eq!(err, "exit: abc: numeric argument required\n");
    }

    #[test]
    fn cat_concatenates_in_argument_order() {
        let dir = make_unique_temp_dir("cat");
        let a = dir.join("a.txt");
        let b = dir.join("b.txt");
        fs::write(&a, "first\n").unwrap();
        fs::write(&b, "second\n").unwrap();

        let (outcome, out, err) =
            run_builtin(&Cat, &[&b.to_string_lossy(), &a.to_string_lossy()]);
        assert_eq!(outcome, Outcome::Code(0));
        assert_eq!(out, "second\nfirst\n");
        assert!(err.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn cat_missing_file_is_a_partial_failure() {
        let dir = make_unique_temp_dir("cat_partial");
        let a = dir.join("a.txt");
        let b = dir.join("b.txt");
        fs::write(&a, "aaa\n").unwrap();
        fs::write(&b, "bbb\n").unwrap();
        let missing = dir.join("missing.txt");

        let (outcome, out, err) = run_builtin(
            &Cat,
            &[
                &a.to_string_lossy(),
                &missing.to_string_lossy(),
                &b.to_string_lossy(),
            ],
        );
        assert_eq!(outcome, Outcome::Code(1));
        assert_eq!(out, "aaa\nbbb\n");
        assert_eq!(
            err,
            format!("cat: {}: No such file or directory\n", missing.display())
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn cat_without_operands_writes_nothing() {
        let (outcome, out, err) = run_builtin(&Cat, &[]);
        assert_eq!(outcome, Outcome::Code(0));
        assert!(out.is_empty());
        assert!(err.is_empty());
    }
}
