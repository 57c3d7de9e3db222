//! Descriptor wiring for redirections.
//!
//! Everything that opens, duplicates or restores a file descriptor lives
//! here. [`RedirectGuard`] owns every descriptor it creates: acquiring it
//! rewires stdout/stderr, dropping it puts them back, and both happen on
//! every path: success, open failure halfway through a redirection list, or
//! a panic in between.

use crate::command::{RedirectMode, Redirection};
use anyhow::{Context, Result};
use log::warn;
use nix::unistd::{close, dup, dup2};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::io::{IntoRawFd, RawFd};
use std::path::Path;

/// Open a redirection target with create semantics, truncating or appending
/// per its mode. Missing parent directories are created first.
fn open_target(redirection: &Redirection) -> Result<File> {
    let path = Path::new(&redirection.path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {}", parent.display()))?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true);
    match redirection.mode {
        RedirectMode::Truncate => options.truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options
        .open(path)
        .with_context(|| format!("cannot open {}", redirection.path))
}

/// Scoped application of a redirection list.
///
/// For each redirection the target descriptor is backed up once (the first
/// time it is touched), the file is opened and duplicated onto the slot, and
/// the now-redundant file descriptor is closed immediately. Applying in
/// source order means a later redirection for the same stream wins while the
/// earlier target still gets opened (and truncated) exactly like a shell.
pub struct RedirectGuard {
    /// original descriptor → duplicated backup
    saved: Vec<(RawFd, RawFd)>,
}

impl RedirectGuard {
    pub fn acquire(redirections: &[Redirection]) -> Result<Self> {
        // Buffered output written before the rewire belongs to the old target.
        flush_stdio();

        let mut guard = RedirectGuard { saved: Vec::new() };
        for redirection in redirections {
            let file_fd = open_target(redirection)?.into_raw_fd();
            let target_fd = redirection.target.fd();

            if !guard.saved.iter().any(|&(orig, _)| orig == target_fd) {
                match dup(target_fd) {
                    Ok(backup) => guard.saved.push((target_fd, backup)),
                    Err(e) => {
                        let _ = close(file_fd);
                        return Err(e)
                            .with_context(|| format!("cannot back up descriptor {target_fd}"));
                    }
                }
            }

            if let Err(e) = dup2(file_fd, target_fd) {
                let _ = close(file_fd);
                return Err(e).with_context(|| format!("cannot redirect to {}", redirection.path));
            }
            let _ = close(file_fd);
        }
        Ok(guard)
    }

    /// Keep the wiring in place: close the backups without restoring.
    ///
    /// Used immediately before the process image is replaced, where the
    /// redirections must outlive this code and the backups must not leak
    /// into the new program.
    pub fn persist(mut self) {
        for (_, backup) in self.saved.drain(..) {
            let _ = close(backup);
        }
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        // Anything still buffered was written while redirected.
        flush_stdio();
        for (target, backup) in self.saved.drain(..).rev() {
            if let Err(e) = dup2(backup, target) {
                warn!("failed to restore descriptor {target}: {e}");
            }
            let _ = close(backup);
        }
    }
}

fn flush_stdio() {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
}
