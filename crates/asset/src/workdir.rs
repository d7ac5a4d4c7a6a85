//! Scoped switch of the process working directory.
//!
//! The working directory is process-wide state. Every [`WorkingDirGuard`]
//! holds the load lock for its whole lifetime, so two loads can never
//! interleave their directory changes. The lock is reentrant: a thread that
//! already holds [`lock()`] may still open a guard.

use std::{
    env,
    path::{Path, PathBuf},
};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard, const_reentrant_mutex};

use crate::error::{AssetError, AssetResult};

static LOAD_LOCK: ReentrantMutex<()> = const_reentrant_mutex(());

/// Acquire the process-wide load lock. Hold it while observing the working
/// directory if other threads may be loading models.
pub fn lock() -> ReentrantMutexGuard<'static, ()> {
    LOAD_LOCK.lock()
}

/// Restores the previous working directory exactly once, on [`exit`] or drop.
///
/// [`exit`]: WorkingDirGuard::exit
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct WorkingDirGuard {
    previous: PathBuf,
    restored: bool,
    _lock: ReentrantMutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    /// Switch into `target`. An empty path keeps the current directory.
    /// On error the working directory is left untouched.
    pub fn enter(target: impl AsRef<Path>) -> AssetResult<Self> {
        let target = target.as_ref();
        let lock = lock();

        let previous = env::current_dir().map_err(|e| AssetError::filesystem(".", e))?;
        if !target.as_os_str().is_empty() {
            env::set_current_dir(target).map_err(|e| AssetError::filesystem(target, e))?;
        }
        log::debug!(
            "Working directory: {} -> {}",
            previous.display(),
            target.display()
        );

        Ok(Self {
            previous,
            restored: false,
            _lock: lock,
        })
    }

    /// Directory that will be restored.
    pub fn previous(&self) -> &Path {
        &self.previous
    }

    /// Restore the previous directory, reporting failure.
    pub fn exit(mut self) -> AssetResult<()> {
        self.restore()
    }

    fn restore(&mut self) -> AssetResult<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        env::set_current_dir(&self.previous)
            .map_err(|e| AssetError::filesystem(&self.previous, e))?;
        log::debug!("Working directory restored to {}", self.previous.display());
        Ok(())
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("Failed to restore working directory: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_restores_previous_directory() {
        let _lock = lock();
        let before = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let guard = WorkingDirGuard::enter(dir.path()).expect("enter temp dir");
        assert_eq!(guard.previous(), before.as_path());
        assert_eq!(
            env::current_dir().unwrap().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
        guard.exit().expect("restore");

        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn drop_restores_on_early_return() {
        fn failing_scope(dir: &Path) -> AssetResult<()> {
            let _guard = WorkingDirGuard::enter(dir)?;
            Err(AssetError::parse(0, "boom"))
        }

        let _lock = lock();
        let before = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = failing_scope(dir.path()).expect_err("scope fails");
        assert!(err.is_parse());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn missing_directory_fails_without_changing_directory() {
        let _lock = lock();
        let before = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = WorkingDirGuard::enter(&missing).err().expect("missing dir");
        assert!(matches!(err, AssetError::Filesystem { .. }));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn empty_target_keeps_directory() {
        let _lock = lock();
        let before = env::current_dir().unwrap();
        let guard = WorkingDirGuard::enter("").unwrap();
        assert_eq!(env::current_dir().unwrap(), before);
        drop(guard);
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
