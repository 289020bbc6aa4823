//! Masks: ordered, deduplicated sets of records staged for relocation.
//!
//! A mask is only changed through its own operations; each operation returns a
//! new mask. Records are unique by `original_path`, and the sequence order is
//! the processing order unless a sort is applied.
//!
//! Once a union or difference has been applied the mask is marked disjoint:
//! its order no longer reflects a single discovery scan.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::{BitOr, Sub};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::errors::ParseError;
use crate::fs_ops::FileStore;
use crate::record::Record;
use crate::resolve::resolve;
use crate::shift::Shift;
use crate::window::SelectionWindow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask {
    records: Vec<Record>,
    paths: HashSet<PathBuf>,
    disjoint: bool,
}

/// Result of turning raw paths into a mask.
#[derive(Debug, Default)]
pub struct Gathered {
    pub mask: Mask,
    /// Site images whose timestamp could not be read.
    pub unparsable: Vec<PathBuf>,
    /// Files that are not site images at all.
    pub ignored: usize,
}

/// Why a record's destination is not free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollisionKind {
    /// Something already sits at the destination and will not have moved away in time.
    Occupied,
    /// An earlier record in the mask is headed for the same destination.
    Contended { with: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub record: Record,
    pub destination: PathBuf,
    pub kind: CollisionKind,
}

impl Mask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, keeping the first occurrence of each path.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut mask = Self::new();
        for record in records {
            mask.insert(record);
        }
        mask
    }

    /// Parse `paths` as images of `site`. Order of `paths` becomes discovery order.
    pub fn gather<S: FileStore + ?Sized>(
        paths: impl IntoIterator<Item = PathBuf>,
        site: &str,
        store: &S,
    ) -> Gathered {
        let mut out = Gathered::default();
        for path in paths {
            match Record::discover(&path, site, store) {
                Ok(record) => {
                    out.mask.insert(record);
                }
                Err(err @ ParseError::MalformedTimestamp { .. }) => {
                    debug!(path = %path.display(), "{err} (skipped)");
                    out.unparsable.push(path);
                }
                Err(err) => {
                    trace!(path = %path.display(), "{err}");
                    out.ignored += 1;
                }
            }
        }
        debug!(
            records = out.mask.len(),
            unparsable = out.unparsable.len(),
            ignored = out.ignored,
            "gathered site images"
        );
        out
    }

    fn insert(&mut self, record: Record) -> bool {
        if self.paths.insert(record.original_path().to_path_buf()) {
            self.records.push(record);
            true
        } else {
            false
        }
    }

    fn derive(&self, records: impl IntoIterator<Item = Record>, disjoint: bool) -> Mask {
        let mut mask = Mask::from_records(records);
        mask.disjoint = disjoint;
        mask
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }

    pub fn contains(&self, original_path: &Path) -> bool {
        self.paths.contains(original_path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub(crate) fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Records whose date and time of day both fall inside `window`.
    pub fn filter(&self, window: &SelectionWindow) -> Mask {
        let kept = self
            .records
            .iter()
            .filter(|r| window.contains(r.timestamp()))
            .cloned();
        self.derive(kept, self.disjoint)
    }

    /// Records whose date stays inside `window`'s day range after being moved by `shift`.
    ///
    /// The time-of-day band is not checked. Records with no representable
    /// shifted timestamp are dropped as well.
    pub fn confine(&self, window: &SelectionWindow, shift: Shift) -> Mask {
        let kept = self
            .records
            .iter()
            .filter(|r| {
                let inside = r
                    .identity()
                    .shifted(shift)
                    .is_some_and(|moved| window.contains_date(moved.timestamp));
                if !inside {
                    debug!(path = %r.original_path().display(), %shift, "shifted date leaves the selected range (excluded)");
                }
                inside
            })
            .cloned();
        self.derive(kept, self.disjoint)
    }

    /// Every record of either mask; receiver order first.
    pub fn union(&self, other: &Mask) -> Mask {
        let all = self.records.iter().chain(other.records.iter()).cloned();
        self.derive(all, true)
    }

    /// Receiver records that are not in `other`.
    pub fn difference(&self, other: &Mask) -> Mask {
        let kept = self
            .records
            .iter()
            .filter(|r| !other.contains(r.original_path()))
            .cloned();
        self.derive(kept, true)
    }

    /// Stable ascending sort by timestamp; ties keep discovery order.
    pub fn sorted_by_timestamp(&self) -> Mask {
        let mut records = self.records.clone();
        records.sort_by_key(|r| r.timestamp());
        self.derive(records, self.disjoint)
    }

    /// Order in which relocating by `shift` never waits on a slot held by a later record.
    ///
    /// Moving back in time fills slots vacated by earlier images, so earliest first;
    /// moving forward fills slots held by later images, so latest first.
    pub fn sorted_for_shift(&self, shift: Shift) -> Mask {
        if !shift.is_positive() {
            return self.sorted_by_timestamp();
        }
        let mut records = self.records.clone();
        records.sort_by_key(|r| std::cmp::Reverse(r.timestamp()));
        self.derive(records, self.disjoint)
    }

    /// Records whose image destination would not be free when their turn comes.
    ///
    /// Walks the mask in its current order without touching the disk beyond
    /// existence checks. A colliding record stays put, so its source is not
    /// treated as vacated for later records. Existence checks that fail count
    /// as occupied. Records with no representable shifted name are skipped here;
    /// the relocator reports them.
    pub fn detect_collisions<S: FileStore + ?Sized>(
        &self,
        archive_root: &Path,
        shift: Shift,
        store: &S,
    ) -> Vec<Collision> {
        let mut vacated: HashSet<&Path> = HashSet::new();
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        let mut collisions = Vec::new();

        for record in &self.records {
            let source = record.original_path();
            let Some(moved) = record.identity().shifted(shift) else {
                continue;
            };
            let destination = resolve(&moved, archive_root).image;

            if destination == source {
                claimed.insert(destination, source);
                continue;
            }

            let kind = if let Some(other) = claimed.get(&destination) {
                Some(CollisionKind::Contended {
                    with: other.to_path_buf(),
                })
            } else if store.exists(&destination).unwrap_or(true)
                && !vacated.contains(destination.as_path())
            {
                Some(CollisionKind::Occupied)
            } else {
                None
            };

            match kind {
                Some(kind) => collisions.push(Collision {
                    record: record.clone(),
                    destination,
                    kind,
                }),
                None => {
                    claimed.insert(destination, source);
                    vacated.insert(source);
                }
            }
        }
        collisions
    }
}

impl FromIterator<Record> for Mask {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Mask::from_records(iter)
    }
}

impl<'a> IntoIterator for &'a Mask {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl BitOr<&Mask> for &Mask {
    type Output = Mask;

    fn bitor(self, rhs: &Mask) -> Mask {
        self.union(rhs)
    }
}

impl Sub<&Mask> for &Mask {
    type Output = Mask;

    fn sub(self, rhs: &Mask) -> Mask {
        self.difference(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Identity, Modality};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io;

    /// Store that answers existence from a fixed set and never mutates.
    struct FixedStore(HashSet<PathBuf>);

    impl FileStore for FixedStore {
        fn exists(&self, path: &Path) -> io::Result<bool> {
            Ok(self.0.contains(path))
        }
        fn create_dir_all(&self, _dir: &Path) -> io::Result<()> {
            Ok(())
        }
        fn rename(&self, _src: &Path, _dst: &Path) -> io::Result<()> {
            Err(io::Error::other("read-only store"))
        }
    }

    fn ts(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn rec(day: u32, h: u32) -> Record {
        let id = Identity::new("harvard", Modality::Visible, ts(day, h));
        let path = resolve(&id, Path::new("/a")).image;
        Record::new(id, path, false)
    }

    #[test]
    fn duplicates_are_dropped() {
        let m = Mask::from_records([rec(1, 1), rec(1, 1), rec(1, 2)]);
        assert_eq!(m.len(), 2);
        assert!(!m.is_disjoint());
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let a = rec(1, 5);
        let ir = Record::new(
            Identity::new("harvard", Modality::Infrared, ts(1, 5)),
            "/a/harvard/2021/03/harvard_IR_2021_03_01_050000.jpg",
            false,
        );
        let m = Mask::from_records([rec(2, 0), a.clone(), ir.clone()]).sorted_by_timestamp();
        let order: Vec<_> = m.iter().map(|r| r.original_path().to_path_buf()).collect();
        assert_eq!(order[0], a.original_path());
        assert_eq!(order[1], ir.original_path());
    }

    #[test]
    fn forward_shift_sorts_latest_first() {
        let m = Mask::from_records([rec(1, 1), rec(1, 3), rec(1, 2)]);
        let order: Vec<_> = m
            .sorted_for_shift(Shift::from_hm(false, 1, 0))
            .iter()
            .map(|r| r.timestamp())
            .collect();
        assert_eq!(order, vec![ts(1, 3), ts(1, 2), ts(1, 1)]);
    }

    #[test]
    fn chain_backwards_has_no_collisions_in_order() {
        // 01:00 <- 02:00 <- 03:00, every destination is the previous record's source.
        let m = Mask::from_records([rec(1, 3), rec(1, 1), rec(1, 2)]);
        let on_disk: HashSet<PathBuf> = m.iter().map(|r| r.original_path().to_path_buf()).collect();
        let store = FixedStore(on_disk);
        let shift = Shift::from_hm(true, 1, 0);

        let ordered = m.sorted_for_shift(shift);
        assert!(ordered.detect_collisions(Path::new("/a"), shift, &store).is_empty());

        // Unsorted, 03:00 -> 02:00 runs before 02:00 has left.
        let unsorted = m.detect_collisions(Path::new("/a"), shift, &store);
        assert_eq!(unsorted.len(), 1);
        assert_eq!(unsorted[0].kind, CollisionKind::Occupied);
        assert_eq!(unsorted[0].record.timestamp(), ts(1, 3));
    }

    #[test]
    fn collided_record_does_not_vacate() {
        // 04:00 is occupied by a file outside the mask; 03:00 -> 04:00 collides,
        // so 02:00 -> 03:00 must collide too.
        let m = Mask::from_records([rec(1, 3), rec(1, 2)]);
        let mut on_disk: HashSet<PathBuf> = m.iter().map(|r| r.original_path().to_path_buf()).collect();
        on_disk.insert(rec(1, 4).original_path().to_path_buf());
        let store = FixedStore(on_disk);

        let collisions = m.detect_collisions(Path::new("/a"), Shift::from_hm(false, 1, 0), &store);
        assert_eq!(collisions.len(), 2);
    }

    #[test]
    fn same_destination_is_contended() {
        let a = rec(1, 2);
        let stray = Record::new(a.identity().clone(), "/a/harvard/2021/04/harvard_2021_03_01_020000.jpg", false);
        let m = Mask::from_records([a.clone(), stray]);
        let store = FixedStore(HashSet::new());

        let collisions = m.detect_collisions(Path::new("/a"), Shift::from_hm(false, 0, 30), &store);
        assert_eq!(collisions.len(), 1);
        assert_eq!(
            collisions[0].kind,
            CollisionKind::Contended {
                with: a.original_path().to_path_buf()
            }
        );
    }

    #[test]
    fn confine_checks_dates_not_time_of_day() {
        let m = Mask::from_records([rec(15, 2), rec(31, 20)]);
        let window = SelectionWindow::parse("2021-03-01", "2021-03-31", Some("00:00"), Some("08:00")).unwrap();
        let kept = m.confine(&window, Shift::from_hm(false, 8, 0));
        let stamps: Vec<_> = kept.iter().map(|r| r.timestamp()).collect();
        assert_eq!(stamps, vec![ts(15, 2)]);
    }

    #[test]
    fn unrepresentable_shift_is_confined_out_and_not_collided() {
        let m = Mask::from_records([rec(1, 1)]);
        let window = SelectionWindow::parse("2021-03-01", "2021-03-31", None, None).unwrap();
        let huge = Shift::parse("4000000000:00").unwrap();
        assert!(m.confine(&window, huge).is_empty());
        let store = FixedStore(HashSet::new());
        assert!(m.detect_collisions(Path::new("/a"), huge, &store).is_empty());
    }

    #[test]
    fn zero_shift_is_never_a_collision() {
        let m = Mask::from_records([rec(1, 1)]);
        let store = FixedStore(m.iter().map(|r| r.original_path().to_path_buf()).collect());
        assert!(m.detect_collisions(Path::new("/a"), Shift::ZERO, &store).is_empty());
    }
}
