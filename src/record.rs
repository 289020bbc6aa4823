//! Parsed image records.
//! - `Identity` is what a filename encodes (site, modality, timestamp).
//! - `Record` pairs an identity with where the file was found.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::errors::ParseError;
use crate::fs_ops::FileStore;
use crate::resolve::companion_of;
use crate::shift::Shift;

/// Capture modality, encoded by an `_IR_` filename segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Visible,
    Infrared,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    pub site: String,
    pub modality: Modality,
    pub timestamp: NaiveDateTime,
}

impl Identity {
    pub fn new(site: impl Into<String>, modality: Modality, timestamp: NaiveDateTime) -> Self {
        Self {
            site: site.into(),
            modality,
            timestamp,
        }
    }

    /// Same site and modality, timestamp moved by `shift`.
    ///
    /// `None` when the moved timestamp overflows or has no four-digit year,
    /// since no archive filename could carry it.
    pub fn shifted(&self, shift: Shift) -> Option<Identity> {
        let timestamp = shift
            .delta()
            .and_then(|d| self.timestamp.checked_add_signed(d))
            .filter(|ts| codec::representable(*ts))?;
        Some(Identity {
            site: self.site.clone(),
            modality: self.modality,
            timestamp,
        })
    }

    /// Canonical filename for this identity.
    pub fn file_name(&self) -> String {
        codec::render(self)
    }
}

/// A discovered image: its identity plus its location at discovery time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    identity: Identity,
    original_path: PathBuf,
    companion_exists: bool,
}

impl Record {
    pub fn new(identity: Identity, original_path: impl Into<PathBuf>, companion_exists: bool) -> Self {
        Self {
            identity,
            original_path: original_path.into(),
            companion_exists,
        }
    }

    /// Parse `path`'s basename for `site` and note whether its `.meta` sibling exists.
    pub fn discover<S: FileStore + ?Sized>(
        path: &Path,
        site: &str,
        store: &S,
    ) -> Result<Record, ParseError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ParseError::NotCandidate {
                name: path.display().to_string(),
                reason: "file name is not valid UTF-8",
            })?;
        let identity = codec::parse(name, site)?;
        let companion_exists = store.exists(&companion_of(path)).unwrap_or(false);
        Ok(Record::new(identity, path, companion_exists))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn site(&self) -> &str {
        &self.identity.site
    }

    pub fn modality(&self) -> Modality {
        self.identity.modality
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.identity.timestamp
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn companion_path(&self) -> PathBuf {
        companion_of(&self.original_path)
    }

    pub fn companion_exists(&self) -> bool {
        self.companion_exists
    }
}
