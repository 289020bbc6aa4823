//! Archive layout: `<root>/<site>/<YYYY>/<MM>/<filename>`.
//! Year and month come from the identity's own timestamp, so a shifted identity
//! may land in a different month or year directory than its source.

use chrono::Datelike;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::codec::META_EXTENSION;
use crate::record::Identity;

/// Where an identity lives inside the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub image: PathBuf,
    pub meta: PathBuf,
}

pub fn resolve(identity: &Identity, archive_root: &Path) -> Destination {
    let ts = identity.timestamp;
    let image = archive_root
        .join(&identity.site)
        .join(format!("{:04}", ts.year()))
        .join(format!("{:02}", ts.month()))
        .join(identity.file_name());
    let meta = companion_of(&image);
    Destination { image, meta }
}

/// Sibling metadata file of an image path.
pub fn companion_of(image: &Path) -> PathBuf {
    image.with_extension(META_EXTENSION)
}

/// `<root>/<site>`.
pub fn site_dir(archive_root: &Path, site: &str) -> PathBuf {
    archive_root.join(site)
}
