//! Coordination for tests that touch process-global state.
//!
//! The working directory and descriptors 1/2 are shared by every test in the
//! binary; tests that mutate one of them (or assert on output written to the
//! process's own streams) hold the matching lock for their duration.

use std::sync::{Mutex, MutexGuard, OnceLock};

pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
}

pub(crate) fn lock_stdio() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
}
