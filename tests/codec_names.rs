use pheno_offset::ParseError;
use pheno_offset::prelude::*;

#[test]
fn accepted_names_render_back_unchanged() {
    let names = [
        "harvard_2021_03_15_120000.jpg",
        "harvard_IR_2021_03_15_120000.jpg",
        "harvard_2000_01_01_000000.jpg",
        "harvard_2024_02_29_235959.jpg",
    ];
    for name in names {
        let id = parse(name, "harvard").unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(render(&id), name);
    }
}

#[test]
fn infrared_segment_sets_modality() {
    assert_eq!(
        parse("harvard_IR_2021_03_15_120000.jpg", "harvard").unwrap().modality,
        Modality::Infrared
    );
    assert_eq!(
        parse("harvard_2021_03_15_120000.jpg", "harvard").unwrap().modality,
        Modality::Visible
    );
}

#[test]
fn site_prefix_must_match_exactly() {
    let err = parse("harvardlph_2021_03_15_120000.jpg", "harvard").unwrap_err();
    assert!(!err.is_candidate());
    let err = parse("Harvard_2021_03_15_120000.jpg", "harvard").unwrap_err();
    assert!(!err.is_candidate());
}

#[test]
fn site_names_containing_markers_still_parse() {
    // The ROI/cli check only looks past the site prefix.
    let id = parse("clinton_2021_03_15_120000.jpg", "clinton").unwrap();
    assert_eq!(render(&id), "clinton_2021_03_15_120000.jpg");
}

#[test]
fn non_candidates_are_ignored() {
    for name in [
        "harvard_2021_03_15_120000.meta",
        "harvard_2021_03_15_120000.JPG",
        "harvard_DB_1000_ROI.jpg",
        "harvard_2021_03_15_120000_cli.jpg",
    ] {
        let err = parse(name, "harvard").unwrap_err();
        assert!(matches!(err, ParseError::NotCandidate { .. }), "{name}: {err:?}");
    }
}

#[test]
fn malformed_stamps_are_reported() {
    for name in [
        "harvard_2021_3_15_120000.jpg",
        "harvard_2021_02_30_120000.jpg",
        "harvard_2021_03_15_250000.jpg",
        "harvard_2021-03-15_120000.jpg",
        "harvard_IR_2021_03_15.jpg",
    ] {
        let err = parse(name, "harvard").unwrap_err();
        assert!(err.is_candidate(), "{name} should be a malformed candidate");
    }
}
