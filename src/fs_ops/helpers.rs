//! I/O error helpers.
//!
//! Turn a bare `io::Error` into a message naming the operation, the path and,
//! where the cause is recognizable, what to check. Relocation failures are
//! stored in the report as these strings.
//!
//! Usage:
//!   fs::read_dir(dir).map_err(io_error_with_help("read site directory", dir))?;
//!   store.rename(a, b).map_err(|e| describe_io_error("rename", a, &e))

use anyhow::anyhow;
use std::io;
use std::path::Path;

fn hint_for(e: &io::Error) -> Option<&'static str> {
    #[cfg(unix)]
    if let Some(code) = e.raw_os_error() {
        let hint = match code {
            libc::EACCES | libc::EPERM => Some("permission denied; check ownership of the archive directories"),
            libc::EXDEV => Some("source and destination are on different filesystems; rename is not possible"),
            libc::ENOENT => Some("path not found; the file may have been moved by another process"),
            libc::EEXIST => Some("destination already exists"),
            libc::ENOTDIR => Some("a path component is not a directory"),
            libc::ENOSPC => Some("insufficient space on device"),
            libc::EROFS => Some("read-only filesystem"),
            libc::ENAMETOOLONG => Some("file name or path too long"),
            _ => None,
        };
        if hint.is_some() {
            return hint;
        }
    }

    match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership of the archive directories"),
        io::ErrorKind::NotFound => Some("path not found; the file may have been moved by another process"),
        io::ErrorKind::AlreadyExists => Some("destination already exists"),
        _ => None,
    }
}

/// `"<op> '<path>': <error> (<hint>) [os code: N]"`.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    if let Some(hint) = hint_for(e) {
        msg.push_str(&format!(" ({hint})"));
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// `map_err` adapter for anyhow code paths.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(describe_io_error(op, path, &e))
}
