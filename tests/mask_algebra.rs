use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};

use pheno_offset::prelude::*;
use pheno_offset::{Collision, CollisionKind};

fn record(day: u32, hour: u32) -> Record {
    let ts = NaiveDate::from_ymd_opt(2021, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap();
    let identity = Identity::new("harvard", Modality::Visible, ts);
    let path = PathBuf::from("/archive/harvard/2021/03").join(identity.file_name());
    Record::new(identity, path, true)
}

fn hours(mask: &Mask) -> Vec<u32> {
    use chrono::Timelike;
    mask.iter().map(|r| r.timestamp().hour()).collect()
}

#[test]
fn union_keeps_receiver_order_and_drops_duplicates() {
    let a = Mask::from_records([record(15, 10), record(15, 12)]);
    let b = Mask::from_records([record(15, 12), record(15, 8)]);

    let u = a.union(&b);
    assert_eq!(hours(&u), vec![10, 12, 8]);
    assert!(u.is_disjoint());
    assert!(!a.is_disjoint());

    // Operator form agrees.
    assert_eq!(&a | &b, u);
}

#[test]
fn difference_removes_by_original_path() {
    let a = Mask::from_records([record(15, 10), record(15, 11), record(15, 12)]);
    let b = Mask::from_records([record(15, 11)]);

    let d = &a - &b;
    assert_eq!(hours(&d), vec![10, 12]);
    assert!(d.is_disjoint());
    assert!(!d.contains(record(15, 11).original_path()));
}

#[test]
fn union_then_sort_restores_chronology() {
    let a = Mask::from_records([record(16, 9)]);
    let b = Mask::from_records([record(14, 9), record(15, 9)]);
    let sorted = a.union(&b).sorted_by_timestamp();
    let days: Vec<_> = sorted.iter().map(|r| r.timestamp().date().to_string()).collect();
    assert_eq!(days, vec!["2021-03-14", "2021-03-15", "2021-03-16"]);
}

#[test]
fn filter_respects_time_of_day() {
    let mask = Mask::from_records([record(14, 6), record(15, 12), record(16, 20), record(20, 12)]);
    let window = SelectionWindow::parse("2021-03-14", "2021-03-16", Some("08:00"), Some("18:00")).unwrap();
    let kept = mask.filter(&window);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.iter().next().unwrap().timestamp().date().to_string(), "2021-03-15");
}

#[test]
fn positive_shift_orders_latest_first() {
    let mask = Mask::from_records([record(15, 10), record(15, 12), record(15, 11)]);
    let forward = mask.sorted_for_shift(Shift::parse("+01:00").unwrap());
    assert_eq!(hours(&forward), vec![12, 11, 10]);
    let backward = mask.sorted_for_shift(Shift::parse("-01:00").unwrap());
    assert_eq!(hours(&backward), vec![10, 11, 12]);
}

#[test]
fn chain_shift_collides_only_in_naive_order() {
    let records = [record(15, 10), record(15, 11), record(15, 12)];
    let store = OnDisk(records.iter().map(|r| r.original_path().to_path_buf()).collect());
    let mask = Mask::from_records(records);
    let shift = Shift::parse("+01:00").unwrap();
    let root = PathBuf::from("/archive");

    // Earliest first, 10:00 and 11:00 would land on files that have not moved yet.
    let naive = mask.sorted_by_timestamp().detect_collisions(&root, shift, &store);
    assert_eq!(naive.len(), 2);
    assert!(naive.iter().all(|c| c.kind == CollisionKind::Occupied));

    let safe = mask.sorted_for_shift(shift).detect_collisions(&root, shift, &store);
    assert!(safe.is_empty());
}

#[test]
fn duplicate_destinations_are_contended() {
    // Two files carrying the same timestamp in different directories.
    let ts = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
    let identity = Identity::new("harvard", Modality::Visible, ts);
    let first = Record::new(identity.clone(), "/archive/harvard/2021/03/harvard_2021_03_15_120000.jpg", false);
    let stray = Record::new(identity, "/archive/harvard/2021/04/harvard_2021_03_15_120000.jpg", false);
    let mask = Mask::from_records([first.clone(), stray]);

    let collisions: Vec<Collision> =
        mask.detect_collisions(&PathBuf::from("/archive"), Shift::parse("+00:30").unwrap(), &OnDisk(Vec::new()));
    assert_eq!(collisions.len(), 1);
    assert_eq!(
        collisions[0].kind,
        CollisionKind::Contended {
            with: first.original_path().to_path_buf()
        }
    );
}

/// Existence answered from a fixed list; never mutates.
struct OnDisk(Vec<PathBuf>);

impl FileStore for OnDisk {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        Ok(self.0.iter().any(|p| p == path))
    }
    fn create_dir_all(&self, _dir: &Path) -> io::Result<()> {
        Ok(())
    }
    fn rename(&self, _src: &Path, _dst: &Path) -> io::Result<()> {
        Err(io::Error::other("read-only store"))
    }
}
