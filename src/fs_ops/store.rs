//! Persistence primitive used by discovery, collision checks and the relocator.

use std::fs;
use std::io;
use std::path::Path;

/// Minimal filesystem surface the relocation engine needs.
///
/// `rename` is expected to be atomic when source and destination share a volume.
pub trait FileStore {
    fn exists(&self, path: &Path) -> io::Result<bool>;
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;
    fn rename(&self, src: &Path, dst: &Path) -> io::Result<()>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl FileStore for LocalStore {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        // symlink_metadata so a dangling link still counts as occupying the name
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn rename(&self, src: &Path, dst: &Path) -> io::Result<()> {
        super::atomic::try_atomic_move(src, dst)
    }
}

impl<S: FileStore + ?Sized> FileStore for &S {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        (**self).exists(path)
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        (**self).create_dir_all(dir)
    }

    fn rename(&self, src: &Path, dst: &Path) -> io::Result<()> {
        (**self).rename(src, dst)
    }
}
