//! Atomic rename helper.
//! - No copy fallback: a cross-device rename is reported to the caller as a failure.
//! - On Windows, removes an existing destination first (MoveFile doesn't overwrite).
//! - On Unix, best-effort fsync of the destination directory after rename.

use std::fs;
use std::io;
use std::path::Path;

pub fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if let Err(e) = fs::remove_file(dst) {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(e);
            }
        }
    }

    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // A failed fsync must not turn a completed rename into a reported failure.
        let _ = fsync_dir(parent);
    }

    Ok(())
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renames_and_replaces() {
        let td = tempdir().unwrap();
        let a = td.path().join("a.jpg");
        let b = td.path().join("b.jpg");
        fs::write(&a, b"new").unwrap();
        fs::write(&b, b"old").unwrap();
        try_atomic_move(&a, &b).unwrap();
        assert!(!a.exists());
        assert_eq!(fs::read(&b).unwrap(), b"new");
    }

    #[test]
    fn missing_source_is_an_error() {
        let td = tempdir().unwrap();
        let err = try_atomic_move(&td.path().join("nope"), &td.path().join("b")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
