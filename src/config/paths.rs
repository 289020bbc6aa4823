//! Default path helpers and symlink checks.
//! Determines the config/log locations and detects symlinked ancestors for safety.

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

const APP_DIR: &str = "pheno_offset";
const CONFIG_FILE: &str = "config.xml";
const LOG_FILE: &str = "pheno_offset.log";

/// Config file location.
///
/// Precedence:
/// 1) `$PHENO_OFFSET_CONFIG`: a file path, or a directory (then `config.xml` inside it);
///    relative values are resolved against the current directory
/// 2) `<os config dir>/pheno_offset/config.xml`
/// 3) `$HOME/.config/pheno_offset/config.xml`
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV) {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            p = env::current_dir()
                .context("resolve relative PHENO_OFFSET_CONFIG")?
                .join(p);
        }
        if p.is_dir() {
            p.push(CONFIG_FILE);
        }
        return Ok(p);
    }

    if let Some(base) = config_dir() {
        return Ok(base.join(APP_DIR).join(CONFIG_FILE));
    }
    env::var_os("HOME")
        .map(|h| PathBuf::from(h).join(".config").join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| anyhow!("cannot determine a config directory (no config dir and no HOME)"))
}

/// Default log file: next to the config file.
pub fn default_log_path() -> Result<PathBuf> {
    let cfg = default_config_path()?;
    let dir = cfg
        .parent()
        .ok_or_else(|| anyhow!("config path has no parent: {}", cfg.display()))?;
    Ok(dir.join(LOG_FILE))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() && fs::symlink_metadata(anc)?.file_type().is_symlink() {
            return Ok(true);
        }
        p = anc.parent();
    }
    Ok(false)
}
