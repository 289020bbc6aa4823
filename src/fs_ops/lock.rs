//! Advisory site lock.
//!
//! Two runs against the same site would each trust a stale snapshot of which
//! destinations exist, so the binary holds `<root>/<site>/.pheno_offset.lock`
//! for the whole run. The library itself never takes the lock.
//!
//! Notes:
//! - Locking uses `fs2` (flock on Unix, LockFileEx on Windows).
//! - The lock is released, and the lock file removed, when `SiteLock` drops.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

pub const LOCK_FILE_NAME: &str = ".pheno_offset.lock";

/// RAII guard held while a site is locked.
#[derive(Debug)]
pub struct SiteLock {
    file: File,
    path: PathBuf,
}

impl SiteLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SiteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

fn open_lock_file(site_dir: &Path) -> io::Result<(File, PathBuf)> {
    let path = site_dir.join(LOCK_FILE_NAME);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)?;
    Ok((file, path))
}

/// Block until the site lock is available.
pub fn acquire_site_lock(site_dir: &Path) -> io::Result<SiteLock> {
    let (file, path) = open_lock_file(site_dir)?;
    file.lock_exclusive()?;
    trace!(path = %path.display(), "site lock acquired");
    Ok(SiteLock { file, path })
}

/// Non-blocking attempt. `Ok(None)` means another process holds the lock.
pub fn try_acquire_site_lock(site_dir: &Path) -> io::Result<Option<SiteLock>> {
    let (file, path) = open_lock_file(site_dir)?;
    match file.try_lock_exclusive() {
        Ok(()) => {
            trace!(path = %path.display(), "site lock acquired");
            Ok(Some(SiteLock { file, path }))
        }
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
            trace!(path = %path.display(), "site lock is held elsewhere");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
