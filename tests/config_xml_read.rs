use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use pheno_offset::config::types::LogLevel;
use pheno_offset::load_config_from_xml_path;

#[test]
fn reads_all_fields() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        r#"<config>
  <archive_root>/data/archive</archive_root>
  <log_level>debug</log_level>
  <log_file>/var/log/pheno_offset.log</log_file>
  <confine_to_range>false</confine_to_range>
</config>"#,
    )
    .unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.archive_root, PathBuf::from("/data/archive"));
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file, Some(PathBuf::from("/var/log/pheno_offset.log")));
    assert!(!cfg.confine_to_range);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><log_level>quiet</log_level></config>").unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.archive_root, PathBuf::from("/projects/phenocam/data/archive"));
    assert_eq!(cfg.log_level, LogLevel::Quiet);
    assert!(cfg.log_file.is_none());
    assert!(cfg.confine_to_range);
}

#[test]
fn whitespace_and_empty_values_are_trimmed() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(
        &cfg_path,
        "<config>\n  <archive_root>  /data/archive  </archive_root>\n  <log_file>   </log_file>\n  <confine_to_range> true </confine_to_range>\n</config>",
    )
    .unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.archive_root, PathBuf::from("/data/archive"));
    assert!(cfg.log_file.is_none());
    assert!(cfg.confine_to_range);
}

#[test]
fn malformed_xml_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><archive_root>/x</config>").unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err:#}").contains("parse config xml"));
}
