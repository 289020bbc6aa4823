//! CLI definition and parsing.
//! Defines Args and turns them into a `Job` plus config overrides.
//!
//! Notes:
//! - One of --positive / --negative is required so the direction is never implied.
//! - --image-only and --meta-only are hidden; they exist for repairing half-moved archives.
//! - Nothing is renamed unless --ignore-warning is given; without it the binary
//!   prints the data-safety warning and exits.
//! - --not-before / --not-after narrow a run to what an interrupted run left;
//!   the interrupt notice prints the exact flag to add.

use clap::{ArgAction, ArgGroup, Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, Job, LogLevel};
use crate::errors::PhenoOffsetError;
use crate::relocate::Selector;
use crate::shift::Shift;
use crate::window::{SelectionWindow, parse_instant};

/// Offset a range of images in a PhenoCam-style archive (e.g. when a camera clock was wrong).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("direction").args(["positive", "negative"])))]
#[command(group(ArgGroup::new("selection").args(["image_only", "meta_only"])))]
pub struct Args {
    /// Site name (case sensitive), e.g. `harvard`.
    #[arg(required_unless_present_any = ["print_config", "init_config"])]
    pub site: Option<String>,

    /// First day to include, YYYY-MM-DD.
    #[arg(value_name = "START_DATE", required_unless_present_any = ["print_config", "init_config"])]
    pub start_date: Option<String>,

    /// Last day to include, YYYY-MM-DD (inclusive).
    #[arg(value_name = "END_DATE", required_unless_present_any = ["print_config", "init_config"])]
    pub end_date: Option<String>,

    /// Time difference, [+|-]HH:MM.
    #[arg(value_name = "OFFSET", allow_hyphen_values = true, required_unless_present_any = ["print_config", "init_config"])]
    pub offset: Option<String>,

    /// Add the offset to the recorded time.
    #[arg(long)]
    pub positive: bool,

    /// Flip the direction of the offset (+08:00 becomes -08:00).
    #[arg(long)]
    pub negative: bool,

    /// Earliest time of day to include, HH:MM[:SS].
    #[arg(long, value_name = "TIME")]
    pub start_time: Option<String>,

    /// Latest time of day to include, HH:MM[:SS] (inclusive).
    #[arg(long, value_name = "TIME")]
    pub end_time: Option<String>,

    /// Skip images taken before this instant, YYYY-MM-DDTHH:MM:SS.
    #[arg(long, value_name = "DATETIME")]
    pub not_before: Option<String>,

    /// Skip images taken after this instant, YYYY-MM-DDTHH:MM:SS.
    #[arg(long, value_name = "DATETIME")]
    pub not_after: Option<String>,

    /// Show what would be done, but do not rename anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Replace files already present at a destination. Dangerous.
    #[arg(long, hide = true)]
    pub overwrite: bool,

    /// Move only metadata files.
    #[arg(long, hide = true)]
    pub meta_only: bool,

    /// Move only image files.
    #[arg(long, hide = true)]
    pub image_only: bool,

    /// Also move images whose corrected time falls outside START_DATE..END_DATE.
    #[arg(long)]
    pub allow_outside_range: bool,

    /// Acknowledge the data-safety warning and actually run.
    #[arg(long)]
    pub ignore_warning: bool,

    /// Override the archive root (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub archive_root: Option<PathBuf>,

    /// More output; repeat for debug detail.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Set log level: quiet, normal, info, debug. Overrides -v.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long)]
    pub json: bool,

    /// Print every outcome as a JSON line instead of the console summary.
    #[arg(long)]
    pub report_json: bool,

    /// Print the config file location and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Write a template config file at the config location and exit.
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --log-level value > -v count > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if let Some(level) = self.log_level.as_deref().and_then(LogLevel::parse) {
            return Some(level);
        }
        (self.verbose > 0).then(|| LogLevel::from_verbosity(self.verbose))
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(root) = &self.archive_root {
            cfg.archive_root = root.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.overwrite {
            cfg.overwrite = true;
        }
        if self.allow_outside_range {
            cfg.confine_to_range = false;
        }
        cfg.selector = Selector::from_flags(self.image_only, self.meta_only);
    }

    /// Validate the positional arguments into a Job.
    pub fn job(&self) -> Result<Job, PhenoOffsetError> {
        use PhenoOffsetError::MissingArgument;
        let site = self.site.clone().ok_or(MissingArgument("SITE"))?;
        let start = self.start_date.as_deref().ok_or(MissingArgument("START_DATE"))?;
        let end = self.end_date.as_deref().ok_or(MissingArgument("END_DATE"))?;
        let offset = self.offset.as_deref().ok_or(MissingArgument("OFFSET"))?;

        let window = SelectionWindow::parse(
            start,
            end,
            self.start_time.as_deref(),
            self.end_time.as_deref(),
        )?
        .with_bounds(
            self.not_before.as_deref().map(|v| parse_instant("not-before", v)).transpose()?,
            self.not_after.as_deref().map(|v| parse_instant("not-after", v)).transpose()?,
        )?;
        let shift = Shift::parse(offset)?;
        Ok(Job {
            site,
            window,
            shift,
            negative: self.negative,
        })
    }

    /// True when a direction flag was given (required for a real run).
    pub fn has_direction(&self) -> bool {
        self.positive || self.negative
    }
}

pub fn parse() -> Args {
    Args::parse()
}
