//! Config validation logic.
//! Verifies the archive root and the site directory before a run touches any file.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::errors::PhenoOffsetError;
use crate::fs_ops::io_error_with_help;
use crate::resolve::site_dir;

use super::types::Config;

impl Config {
    /// Check the archive root and `<root>/<site>`; returns the site directory.
    ///
    /// - archive_root must exist and be a directory
    /// - the site directory must exist, be a directory and be readable
    /// - unless dry-run, the site directory must be writable
    pub fn validate(&self, site: &str) -> Result<PathBuf> {
        let root = &self.archive_root;
        if !root.is_dir() {
            error!("archive_root is missing or not a directory: {}", root.display());
            return Err(PhenoOffsetError::ArchiveInvalid(root.clone()).into());
        }

        let site_path = site_dir(root, site);
        if !site_path.is_dir() {
            error!("site directory not found: {}", site_path.display());
            return Err(PhenoOffsetError::SiteNotFound(site_path).into());
        }

        fs::read_dir(&site_path).map_err(io_error_with_help("read site directory", &site_path))?;
        debug!("site directory readable: {}", site_path.display());

        if !self.dry_run {
            check_writable(&site_path).map_err(io_error_with_help("write to site directory", &site_path))?;
            debug!("site directory writable: {}", site_path.display());
        }

        info!(
            "Config validated: archive='{}' site='{}' log_file='{}'",
            root.display(),
            site,
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into())
        );
        Ok(site_path)
    }

    /// Canonicalize the archive root so discovered paths and planned destinations
    /// compare equal. Leaves the path unchanged if it cannot be resolved.
    pub fn normalize(&mut self) {
        if let Ok(real) = dunce::canonicalize(&self.archive_root) {
            self.archive_root = real;
        }
    }
}

/// Create and remove a small scratch file in `dir`; create_new avoids clobbering.
fn check_writable(dir: &Path) -> std::io::Result<()> {
    let scratch = dir.join(format!(".pheno_offset_write_check_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&scratch)?;
    fs::remove_file(&scratch)
}
