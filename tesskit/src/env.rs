//! Scoped process environment for engine initialization.
//!
//! Tesseract reads `TESSDATA_PREFIX` while initializing a handle. The
//! variable is process-global, so each session sets it only for the length
//! of its `init` call, under a lock shared by all sessions, and restores the
//! previous value afterwards.

use crate::error::{Result, TessError};
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Environment variable the engine consults for its traineddata directory.
pub const TESSDATA_PREFIX: &str = "TESSDATA_PREFIX";

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets an environment variable until dropped, then restores the old value.
///
/// Only one `ScopedEnvVar` exists at a time in the process; a second `set`
/// blocks until the first guard is dropped.
pub(crate) struct ScopedEnvVar {
    key: &'static str,
    previous: Option<OsString>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnvVar {
    /// Set `key` to `value` for the lifetime of the guard.
    ///
    /// Values the platform cannot store (an interior NUL) are rejected with
    /// [`TessError::InvalidArgument`] and leave the environment untouched.
    pub(crate) fn set(key: &'static str, value: impl AsRef<OsStr>) -> Result<Self> {
        let value = value.as_ref();
        if value.as_encoded_bytes().contains(&0) {
            return Err(TessError::InvalidArgument(format!(
                "{key} value contains a NUL byte: {value:?}"
            )));
        }
        // The lock protects no data, so a poisoned lock is still usable.
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::env::var_os(key);
        std::env::set_var(key, value);
        Ok(Self {
            key,
            previous,
            _lock: lock,
        })
    }
}

impl Drop for ScopedEnvVar {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}
