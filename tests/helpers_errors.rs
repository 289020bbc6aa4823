use std::io;
use std::path::Path;

use pheno_offset::fs_ops::{describe_io_error, io_error_with_help};

#[test]
fn notfound_hint_includes_op_and_path() {
    let p = Path::new("/nonexistent/harvard/2021/03");
    let err = io_error_with_help("create destination directory", p)(io::Error::from(io::ErrorKind::NotFound));
    let msg = format!("{}", err);
    assert!(msg.contains("create destination directory"));
    assert!(msg.contains(p.to_string_lossy().as_ref()));
    assert!(msg.contains("path not found"));
}

#[cfg(unix)]
#[test]
fn cross_device_hint_present() {
    let p = Path::new("/archive/harvard/2021/03/harvard_2021_03_15_120000.jpg");
    let msg = describe_io_error("rename", p, &io::Error::from_raw_os_error(libc::EXDEV));
    assert!(msg.contains("different filesystems"), "msg was: {}", msg);
    assert!(msg.contains("os code"));
}

#[cfg(unix)]
#[test]
fn readonly_and_space_hints_present() {
    let p = Path::new("/archive");
    let erofs = describe_io_error("rename", p, &io::Error::from_raw_os_error(libc::EROFS));
    let enospc = describe_io_error("rename", p, &io::Error::from_raw_os_error(libc::ENOSPC));
    assert!(erofs.contains("read-only filesystem"));
    assert!(enospc.contains("insufficient space"));
}

#[test]
fn unknown_errors_have_no_hint() {
    let msg = describe_io_error("rename", Path::new("/a"), &io::Error::other("boom"));
    assert_eq!(msg, "rename '/a': boom");
}
