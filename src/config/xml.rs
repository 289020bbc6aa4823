//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - Unknown XML fields are rejected so typos surface instead of silently using defaults.
//! - A missing config file is not an error; defaults apply.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::ARCHIVE_ROOT_DEFAULT;
use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    archive_root: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    confine_to_range: Option<bool>,
}

// Accept "true"/"false" with surrounding whitespace; anything else is treated as unset.
fn de_bool_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<bool>().ok()))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|t| !t.is_empty())
}

fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();
    if let Some(root) = non_empty(parsed.archive_root.as_deref()) {
        cfg.archive_root = PathBuf::from(root);
    }
    if let Some(level) = non_empty(parsed.log_level.as_deref()).and_then(LogLevel::parse) {
        cfg.log_level = level;
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);
    if let Some(confine) = parsed.confine_to_range {
        cfg.confine_to_range = confine;
    }
    cfg
}

/// Load a Config from a specific XML file.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_config(parsed))
}

/// Load the config from `default_config_path()`; defaults when the file is absent.
pub fn load_config() -> Result<Config> {
    let path = default_config_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    debug!(path = %path.display(), "loading config");
    load_config_from_xml_path(&path)
}

/// Write a commented template config. Refuses to replace an existing file or
/// to write below a symlinked directory.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/pheno_offset.log".into());

    let content = format!(
        "<!--\n  pheno_offset configuration (XML)\n\n    archive_root      -> root of the image archive (<root>/<site>/<YYYY>/<MM>/)\n    log_level         -> quiet | normal | info | debug\n    log_file          -> optional log file (console output continues), e.g. {}\n    confine_to_range  -> true: skip images whose corrected time leaves the selected dates\n\n  Command-line flags override these values.\n-->\n<config>\n  <archive_root>{}</archive_root>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <confine_to_range>true</confine_to_range>\n</config>\n",
        suggested_log,
        ARCHIVE_ROOT_DEFAULT
    );

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts
        .open(path)
        .with_context(|| format!("create config '{}'", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("write config '{}'", path.display()))?;

    info!("Created template config at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn template_parses_back_to_defaults() {
        let td = tempdir().unwrap();
        let p = td.path().join("conf").join("config.xml");
        create_template_config(&p).unwrap();
        let cfg = load_config_from_xml_path(&p).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn template_does_not_clobber() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config/>").unwrap();
        assert!(create_template_config(&p).is_err());
        assert_eq!(fs::read_to_string(&p).unwrap(), "<config/>");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.xml");
        fs::write(&p, "<config><archive_root>/x</archive_root><download_base>/y</download_base></config>").unwrap();
        assert!(load_config_from_xml_path(&p).is_err());
    }
}
