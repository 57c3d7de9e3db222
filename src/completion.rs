//! Tab completion for the interactive editor.
//!
//! Only the command position completes: candidates are builtin names plus
//! executables found on the search path, merged, sorted and deduplicated.
//! Arguments are left alone; file completion is the editor user's problem,
//! not this shell's.

use rustyline::Helper;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::ffi::OsStr;

pub struct ShellHelper {
    builtins: Vec<String>,
}

impl ShellHelper {
    pub fn new(builtins: Vec<String>) -> Self {
        ShellHelper { builtins }
    }

    fn command_candidates(&self, search_paths: &OsStr, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .builtins
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.extend(executables_with_prefix(search_paths, prefix));
        names.sort();
        names.dedup();
        names
    }
}

/// Program names starting with `prefix`, scanned from every readable
/// directory on the search path. Unreadable directories are skipped.
fn executables_with_prefix(search_paths: &OsStr, prefix: &str) -> Vec<String> {
    let mut matches = Vec::new();
    for dir in std::env::split_paths(search_paths) {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            if let Ok(name) = entry.file_name().into_string() {
                if name.starts_with(prefix) {
                    matches.push(name);
                }
            }
        }
    }
    matches
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let word_start = head
            .rfind(|c: char| c.is_whitespace())
            .map(|i| i + 1)
            .unwrap_or(0);

        // Not the command position, or nothing typed yet: stay quiet.
        if !head[..word_start].trim().is_empty() || word_start == pos {
            return Ok((pos, Vec::new()));
        }

        let prefix = &head[word_start..];
        let search_paths = std::env::var_os("PATH").unwrap_or_default();
        let candidates = self
            .command_candidates(&search_paths, prefix)
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((word_start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}
impl Validator for ShellHelper {}
impl Helper for ShellHelper {}
