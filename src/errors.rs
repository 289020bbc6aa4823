//! Typed error definitions for pheno_offset.
//! Per-file problems are values (`ParseError`); only configuration problems
//! surface as `PhenoOffsetError` and stop a run before any file is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Why a filename did not produce an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not an image of this site at all (wrong extension, ROI mask, center line, other site).
    #[error("not a candidate image: {name} ({reason})")]
    NotCandidate { name: String, reason: &'static str },

    /// Looks like a site image but the timestamp portion does not parse.
    #[error("file does not follow standard naming: {name}")]
    MalformedTimestamp { name: String },
}

impl ParseError {
    /// True when the file was a plausible image whose name could not be read.
    pub fn is_candidate(&self) -> bool {
        matches!(self, ParseError::MalformedTimestamp { .. })
    }
}

/// Selection window construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range: start date {start} is after end date {end}")]
    Dates { start: String, end: String },

    #[error("invalid range: start time {start} is after end time {end}")]
    Times { start: String, end: String },

    #[error("invalid range: --not-before {not_before} is after --not-after {not_after}")]
    Bounds { not_before: String, not_after: String },

    #[error("invalid {what} '{value}': expected {format}")]
    Format {
        what: &'static str,
        value: String,
        format: &'static str,
    },
}

/// Offset parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftError {
    #[error("invalid offset '{0}': expected [+|-]HH:MM")]
    Format(String),

    #[error("invalid offset '{0}': minutes must be below 60")]
    Minutes(String),
}

#[derive(Debug, Error)]
pub enum PhenoOffsetError {
    #[error(transparent)]
    InvalidRange(#[from] RangeError),

    #[error(transparent)]
    InvalidOffset(#[from] ShiftError),

    #[error("missing required argument {0}")]
    MissingArgument(&'static str),

    #[error("Archive root is missing or not a directory: {0}")]
    ArchiveInvalid(PathBuf),

    #[error("Site directory not found: {0}")]
    SiteNotFound(PathBuf),

    #[error("Another run holds the site lock: {0}")]
    SiteLocked(PathBuf),

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl PhenoOffsetError {
    /// Stable numeric code for logs and exit statuses.
    pub fn code(&self) -> i32 {
        match self {
            PhenoOffsetError::InvalidRange(_) => 10,
            PhenoOffsetError::InvalidOffset(_) => 11,
            PhenoOffsetError::MissingArgument(_) => 12,
            PhenoOffsetError::ArchiveInvalid(_) => 20,
            PhenoOffsetError::SiteNotFound(_) => 21,
            PhenoOffsetError::SiteLocked(_) => 30,
            PhenoOffsetError::Interrupted => 130,
        }
    }
}
