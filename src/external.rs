//! Resolution of external program names against the executable search path.

use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Resolve `name` to an executable path.
///
/// A name containing a slash bypasses the search and is checked directly
/// (`./script.sh`, `/usr/bin/env`, `bin/tool`). A bare name is tried against
/// each directory of `search_paths` in order; the first candidate that is an
/// executable regular file wins.
pub fn find_program(search_paths: &OsStr, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains('/') {
        let path = Path::new(name);
        return is_executable(path).then(|| path.to_path_buf());
    }

    std::env::split_paths(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// [`find_program`] against the current process `PATH`.
///
/// An unset `PATH` resolves nothing; the caller reports "command not found".
pub fn resolve_program(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    find_program(&paths, name)
}

fn is_executable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
