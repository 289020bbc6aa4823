//! Directory walk over a site's part of the archive.
//! Yields regular files in a stable, sorted order so repeated scans produce the
//! same discovery order.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::fs_ops::{FileStore, LOCK_FILE_NAME};
use crate::mask::{Gathered, Mask};
use crate::resolve::site_dir;

/// Every regular file below `dir`, directories and files sorted by name.
/// Unreadable entries are logged and skipped.
pub fn candidate_paths(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && e.file_name() != LOCK_FILE_NAME)
        .map(|e| e.into_path())
}

/// Walk `<archive_root>/<site>` and gather its images.
pub fn scan_site<S: FileStore + ?Sized>(archive_root: &Path, site: &str, store: &S) -> Gathered {
    Mask::gather(candidate_paths(&site_dir(archive_root, site)), site, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::LocalStore;
    use assert_fs::prelude::*;

    #[test]
    fn walk_is_sorted_and_files_only() {
        let root = assert_fs::TempDir::new().unwrap();
        root.child("harvard/2021/04/harvard_2021_04_01_000000.jpg").touch().unwrap();
        root.child("harvard/2021/03/harvard_2021_03_02_000000.jpg").touch().unwrap();
        root.child("harvard/2021/03/harvard_2021_03_01_000000.jpg").touch().unwrap();
        root.child("harvard/2021/03/empty").create_dir_all().unwrap();

        let names: Vec<String> = candidate_paths(&root.path().join("harvard"))
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "harvard_2021_03_01_000000.jpg",
                "harvard_2021_03_02_000000.jpg",
                "harvard_2021_04_01_000000.jpg",
            ]
        );
    }

    #[test]
    fn scan_sorts_files_into_buckets() {
        let root = assert_fs::TempDir::new().unwrap();
        let month = root.child("harvard/2021/03");
        month.child("harvard_2021_03_15_120000.jpg").touch().unwrap();
        month.child("harvard_2021_03_15_120000.meta").touch().unwrap();
        month.child("harvard_2021_3_15_120000.jpg").touch().unwrap();
        month.child("harvard_DB_1000_ROI.jpg").touch().unwrap();

        let gathered = scan_site(root.path(), "harvard", &LocalStore);
        assert_eq!(gathered.mask.len(), 1);
        assert_eq!(gathered.unparsable.len(), 1);
        // the .meta sidecar and the ROI image
        assert_eq!(gathered.ignored, 2);
    }
}
