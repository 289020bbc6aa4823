//! Core configuration types.
//! - Config holds run settings with sensible defaults.
//! - Job names what a run relocates (site, window, shift).
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::ARCHIVE_ROOT_DEFAULT;
use crate::relocate::{RelocateOptions, Selector};
use crate::shift::Shift;
use crate::window::SelectionWindow;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and a summary (default)
    #[default]
    Normal,
    /// Every moved file
    Info,
    /// Planned paths, skipped files, lock activity
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Map a `-v` count onto a level.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Normal,
            1 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the image archive (`<root>/<site>/<YYYY>/<MM>/...`)
    pub archive_root: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Report what would happen without renaming anything
    pub dry_run: bool,
    /// Replace files already present at a destination
    pub overwrite: bool,
    /// Images, metadata, or both
    pub selector: Selector,
    /// Drop images whose shifted time would leave the selected range
    pub confine_to_range: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_root: PathBuf::from(ARCHIVE_ROOT_DEFAULT),
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
            overwrite: false,
            selector: Selector::Both,
            confine_to_range: true,
        }
    }
}

impl Config {
    /// Config for an explicit archive root; other fields use defaults.
    pub fn new(archive_root: impl Into<PathBuf>) -> Self {
        Self {
            archive_root: archive_root.into(),
            ..Default::default()
        }
    }

    /// Relocator options for this config; `negative` is the `--negative` flag.
    pub fn relocate_options(&self, negative: bool) -> RelocateOptions {
        RelocateOptions {
            dry_run: self.dry_run,
            overwrite: self.overwrite,
            selector: self.selector,
            negative_offset: negative,
        }
    }
}

/// One relocation request: which site, which images, by how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub site: String,
    pub window: SelectionWindow,
    /// The offset as typed, before the `--negative` flip.
    pub shift: Shift,
    pub negative: bool,
}

impl Job {
    /// The shift actually applied to timestamps.
    pub fn effective_shift(&self) -> Shift {
        self.shift.with_sign_flip(self.negative)
    }
}
