//! Configuration: types, default paths, XML loading and validation.
//! The XML file supplies site-independent settings; per-run choices (site,
//! dates, offset) come from the command line.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, Job, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file (or a directory holding `config.xml`).
pub const CONFIG_ENV: &str = "PHENO_OFFSET_CONFIG";

/// Archive location used when no config sets one.
pub const ARCHIVE_ROOT_DEFAULT: &str = "/projects/phenocam/data/archive";
