//! Relocation engine.
//!
//! Applies a shift to every record of a mask and moves the image and its
//! companion `.meta` file to the shifted identity's place in the archive.
//!
//! A record whose shifted timestamp has no archive filename (overflow, or a
//! year outside 0000-9999) is reported as Unrepresentable and left alone.
//!
//! Per file, in order:
//! 1. destination == source            -> NoOp (nothing touched)
//! 2. source gone, destination present -> NoOp (already relocated by an earlier run)
//! 3. dry-run                          -> SkippedDryRun
//! 4. destination exists, no overwrite -> SkippedExists
//! 5. mkdir -p + rename                -> Moved, or Failed with the I/O error
//!
//! The companion goes through the same steps independently of the image result
//! and reports MissingCompanion when there is nothing to move. Nothing here
//! aborts the batch; every problem becomes an outcome.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::fs_ops::{describe_io_error, FileStore};
use crate::mask::Mask;
use crate::record::Record;
use crate::resolve::resolve;
use crate::shift::Shift;
use crate::shutdown::ShutdownFlag;

/// Which half of each image/metadata pair to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    ImagesOnly,
    MetaOnly,
    #[default]
    Both,
}

impl Selector {
    /// `--image-only` / `--meta-only`; clap keeps them mutually exclusive.
    pub fn from_flags(image_only: bool, meta_only: bool) -> Self {
        match (image_only, meta_only) {
            (true, false) => Selector::ImagesOnly,
            (false, true) => Selector::MetaOnly,
            _ => Selector::Both,
        }
    }

    pub fn images(self) -> bool {
        matches!(self, Selector::ImagesOnly | Selector::Both)
    }

    pub fn meta(self) -> bool {
        matches!(self, Selector::MetaOnly | Selector::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelocateOptions {
    pub dry_run: bool,
    pub overwrite: bool,
    pub selector: Selector,
    /// Flip the sign of the supplied shift.
    pub negative_offset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    Image,
    Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Moved,
    SkippedExists,
    SkippedDryRun,
    SkippedUnparsable,
    MissingCompanion,
    NoOp,
    Unrepresentable,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationOutcome {
    pub role: FileRole,
    pub kind: OutcomeKind,
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelocationOutcome {
    fn new(role: FileRole, kind: OutcomeKind, source: &Path, target: &Path) -> Self {
        Self {
            role,
            kind,
            source: source.to_path_buf(),
            target: Some(target.to_path_buf()),
            error: None,
        }
    }

    fn failed(role: FileRole, source: &Path, target: &Path, message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::new(role, OutcomeKind::Failed, source, target)
        }
    }

    fn unrepresentable(role: FileRole, source: &Path, message: String) -> Self {
        Self {
            role,
            kind: OutcomeKind::Unrepresentable,
            source: source.to_path_buf(),
            target: None,
            error: Some(message),
        }
    }

    /// A site image whose name could not be read; it is left where it is.
    pub fn unparsable(source: impl Into<PathBuf>) -> Self {
        Self {
            role: FileRole::Image,
            kind: OutcomeKind::SkippedUnparsable,
            source: source.into(),
            target: None,
            error: None,
        }
    }
}

/// Counts per outcome kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    pub moved: usize,
    pub skipped_exists: usize,
    pub skipped_dry_run: usize,
    pub skipped_unparsable: usize,
    pub missing_companion: usize,
    pub no_op: usize,
    pub unrepresentable: usize,
    pub failed: usize,
}

/// Narrowing that selects exactly the records an interrupted run never reached.
///
/// Relocation order is latest first for a forward shift and earliest first
/// otherwise, so the untouched records sit at one end of the selection and
/// everything already moved lies beyond this bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeBound {
    NotAfter(NaiveDateTime),
    NotBefore(NaiveDateTime),
}

impl fmt::Display for ResumeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (flag, at) = match self {
            ResumeBound::NotAfter(at) => ("--not-after", at),
            ResumeBound::NotBefore(at) => ("--not-before", at),
        };
        write!(f, "{flag} {}", at.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// Records left untouched by an interrupted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Unprocessed {
    pub count: usize,
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
    pub resume: ResumeBound,
}

impl Unprocessed {
    fn of(rest: &[Record], shift: Shift) -> Option<Self> {
        let earliest = rest.iter().map(Record::timestamp).min()?;
        let latest = rest.iter().map(Record::timestamp).max()?;
        let resume = if shift.is_positive() {
            ResumeBound::NotAfter(latest)
        } else {
            ResumeBound::NotBefore(earliest)
        };
        Some(Self {
            count: rest.len(),
            earliest,
            latest,
            resume,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelocationReport {
    pub outcomes: Vec<RelocationOutcome>,
    /// A stop was requested before every record was processed.
    pub interrupted: bool,
    /// What the stop left behind; set together with `interrupted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprocessed: Option<Unprocessed>,
}

impl RelocationReport {
    pub fn tally(&self) -> Tally {
        let mut t = Tally::default();
        for o in &self.outcomes {
            let slot = match o.kind {
                OutcomeKind::Moved => &mut t.moved,
                OutcomeKind::SkippedExists => &mut t.skipped_exists,
                OutcomeKind::SkippedDryRun => &mut t.skipped_dry_run,
                OutcomeKind::SkippedUnparsable => &mut t.skipped_unparsable,
                OutcomeKind::MissingCompanion => &mut t.missing_companion,
                OutcomeKind::NoOp => &mut t.no_op,
                OutcomeKind::Unrepresentable => &mut t.unrepresentable,
                OutcomeKind::Failed => &mut t.failed,
            };
            *slot += 1;
        }
        t
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.kind == OutcomeKind::Failed)
    }

    pub fn of_kind(&self, kind: OutcomeKind) -> impl Iterator<Item = &RelocationOutcome> {
        self.outcomes.iter().filter(move |o| o.kind == kind)
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = RelocationOutcome>) {
        self.outcomes.extend(outcomes);
    }
}

pub struct Relocator<S: FileStore> {
    archive_root: PathBuf,
    shift: Shift,
    options: RelocateOptions,
    store: S,
    shutdown: Option<ShutdownFlag>,
}

impl<S: FileStore> Relocator<S> {
    /// `shift` is the user-supplied delta; `options.negative_offset` flips it here.
    pub fn new(archive_root: impl Into<PathBuf>, shift: Shift, options: RelocateOptions, store: S) -> Self {
        Self {
            archive_root: archive_root.into(),
            shift: shift.with_sign_flip(options.negative_offset),
            options,
            store,
            shutdown: None,
        }
    }

    /// Stop between records once `flag` is raised.
    pub fn with_shutdown(mut self, flag: ShutdownFlag) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// The shift actually applied (sign flip included).
    pub fn shift(&self) -> Shift {
        self.shift
    }

    /// Relocate every record of `mask`, earliest-needed slot first.
    pub fn relocate(&self, mask: Mask) -> RelocationReport {
        let mut report = RelocationReport::default();
        let ordered = mask.sorted_for_shift(self.shift);
        let records = ordered.into_records();
        let total = records.len();

        for (done, record) in records.iter().enumerate() {
            if self.shutdown.as_ref().is_some_and(ShutdownFlag::is_requested) {
                let unprocessed = Unprocessed::of(&records[done..], self.shift);
                if let Some(u) = &unprocessed {
                    warn!(
                        done,
                        total,
                        earliest = %u.earliest,
                        latest = %u.latest,
                        resume = %u.resume,
                        "stop requested; remaining records left untouched"
                    );
                }
                report.interrupted = true;
                report.unprocessed = unprocessed;
                break;
            }
            self.relocate_record(record, &mut report);
        }
        report
    }

    fn relocate_record(&self, record: &Record, report: &mut RelocationReport) {
        let Some(moved) = record.identity().shifted(self.shift) else {
            let message = format!(
                "{} shifted by {} has no archive filename",
                record.timestamp(),
                self.shift
            );
            warn!(path = %record.original_path().display(), "{message}");
            if self.options.selector.images() {
                report
                    .outcomes
                    .push(RelocationOutcome::unrepresentable(FileRole::Image, record.original_path(), message.clone()));
            }
            if self.options.selector.meta() {
                report
                    .outcomes
                    .push(RelocationOutcome::unrepresentable(FileRole::Meta, &record.companion_path(), message));
            }
            return;
        };
        let dest = resolve(&moved, &self.archive_root);
        debug!(
            original = %record.timestamp(),
            modified = %moved.timestamp,
            image = %dest.image.display(),
            meta = %dest.meta.display(),
            "planned"
        );

        if self.options.selector.images() {
            let outcome = self.relocate_file(FileRole::Image, record.original_path(), &dest.image, true);
            report.outcomes.push(outcome);
        }
        if self.options.selector.meta() {
            let outcome = self.relocate_file(
                FileRole::Meta,
                &record.companion_path(),
                &dest.meta,
                record.companion_exists(),
            );
            report.outcomes.push(outcome);
        }
    }

    /// `expected` says whether the source existed at discovery time.
    fn relocate_file(&self, role: FileRole, src: &Path, dst: &Path, expected: bool) -> RelocationOutcome {
        if src == dst {
            debug!(?role, path = %src.display(), "already in place");
            return RelocationOutcome::new(role, OutcomeKind::NoOp, src, dst);
        }

        let src_exists = match self.store.exists(src) {
            Ok(b) => b,
            Err(e) => return self.fail(role, src, dst, describe_io_error("check source", src, &e)),
        };
        let dst_exists = match self.store.exists(dst) {
            Ok(b) => b,
            Err(e) => return self.fail(role, src, dst, describe_io_error("check destination", dst, &e)),
        };

        if !src_exists {
            if expected && dst_exists {
                debug!(?role, dest = %dst.display(), "already relocated");
                return RelocationOutcome::new(role, OutcomeKind::NoOp, src, dst);
            }
            return match role {
                FileRole::Meta => {
                    warn!(path = %src.display(), "Meta file not found");
                    RelocationOutcome::new(role, OutcomeKind::MissingCompanion, src, dst)
                }
                FileRole::Image => {
                    self.fail(role, src, dst, format!("source '{}' no longer exists", src.display()))
                }
            };
        }

        if self.options.dry_run {
            debug!(?role, src = %src.display(), dest = %dst.display(), "dry-run: not moved");
            return RelocationOutcome::new(role, OutcomeKind::SkippedDryRun, src, dst);
        }

        if dst_exists && !self.options.overwrite {
            warn!(?role, dest = %dst.display(), "destination already exists (did NOT move)");
            return RelocationOutcome::new(role, OutcomeKind::SkippedExists, src, dst);
        }

        if let Some(parent) = dst.parent() {
            if let Err(e) = self.store.create_dir_all(parent) {
                return self.fail(role, src, dst, describe_io_error("create destination directory", parent, &e));
            }
        }
        match self.store.rename(src, dst) {
            Ok(()) => {
                info!(?role, src = %src.display(), dest = %dst.display(), "moved");
                RelocationOutcome::new(role, OutcomeKind::Moved, src, dst)
            }
            Err(e) => self.fail(role, src, dst, describe_io_error("rename", src, &e)),
        }
    }

    fn fail(&self, role: FileRole, src: &Path, dst: &Path, message: String) -> RelocationOutcome {
        error!(?role, src = %src.display(), dest = %dst.display(), error = %message, "relocation failed");
        RelocationOutcome::failed(role, src, dst, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_flags() {
        assert_eq!(Selector::from_flags(false, false), Selector::Both);
        assert_eq!(Selector::from_flags(true, false), Selector::ImagesOnly);
        assert_eq!(Selector::from_flags(false, true), Selector::MetaOnly);
        assert!(!Selector::ImagesOnly.meta());
        assert!(!Selector::MetaOnly.images());
    }

    #[test]
    fn tally_counts_kinds() {
        let mut report = RelocationReport::default();
        report.extend([
            RelocationOutcome::unparsable("/a/x.jpg"),
            RelocationOutcome::new(FileRole::Image, OutcomeKind::Moved, Path::new("/a"), Path::new("/b")),
            RelocationOutcome::new(FileRole::Meta, OutcomeKind::Moved, Path::new("/a"), Path::new("/b")),
        ]);
        let t = report.tally();
        assert_eq!(t.moved, 2);
        assert_eq!(t.skipped_unparsable, 1);
        assert!(!report.has_failures());
    }

    #[test]
    fn unprocessed_bound_follows_direction() {
        use crate::record::{Identity, Modality};
        use chrono::NaiveDate;
        let at = |d: u32| NaiveDate::from_ymd_opt(2021, 3, d).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let rest: Vec<Record> = [14, 12, 13]
            .into_iter()
            .map(|d| Record::new(Identity::new("harvard", Modality::Visible, at(d)), format!("/a/{d}.jpg"), false))
            .collect();

        let fwd = Unprocessed::of(&rest, Shift::from_hm(false, 1, 0)).unwrap();
        assert_eq!(fwd.count, 3);
        assert_eq!((fwd.earliest, fwd.latest), (at(12), at(14)));
        assert_eq!(fwd.resume, ResumeBound::NotAfter(at(14)));
        assert_eq!(fwd.resume.to_string(), "--not-after 2021-03-14T08:00:00");

        let back = Unprocessed::of(&rest, Shift::from_hm(true, 1, 0)).unwrap();
        assert_eq!(back.resume, ResumeBound::NotBefore(at(12)));
        assert!(Unprocessed::of(&[], Shift::ZERO).is_none());
    }

    #[test]
    fn negative_offset_flips_shift() {
        let opts = RelocateOptions {
            negative_offset: true,
            ..Default::default()
        };
        let r = Relocator::new("/a", Shift::from_hm(false, 8, 0), opts, crate::fs_ops::LocalStore);
        assert_eq!(r.shift().minutes(), -480);
    }
}
