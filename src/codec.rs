//! Filename codec.
//! Reads and writes the archive naming scheme `<site>[_IR]_YYYY_MM_DD_HHMMSS.jpg`.
//!
//! Rules:
//! - Only `.jpg` files are candidates; ROI masks and center-line (`cli`) images are not.
//! - The infrared form is tried before the visible form.
//! - The timestamp must be exactly `YYYY_MM_DD_HHMMSS` so that rendering a parsed
//!   name always reproduces it byte for byte.

use chrono::{Datelike, NaiveDateTime};

use crate::errors::ParseError;
use crate::record::{Identity, Modality};

pub const IMAGE_EXTENSION: &str = "jpg";
pub const META_EXTENSION: &str = "meta";

const IR_SEGMENT: &str = "IR_";
const STAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";
const STAMP_LEN: usize = 17;
const STAMP_SEPARATORS: [usize; 3] = [4, 7, 10];

/// Parse `filename` as an image of `site`.
pub fn parse(filename: &str, site: &str) -> Result<Identity, ParseError> {
    let not_candidate = |reason| ParseError::NotCandidate {
        name: filename.to_string(),
        reason,
    };

    let stem = filename
        .strip_suffix(IMAGE_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(|| not_candidate("unsupported extension"))?;
    let rest = stem
        .strip_prefix(site)
        .and_then(|s| s.strip_prefix('_'))
        .ok_or_else(|| not_candidate("belongs to another site"))?;
    if rest.contains("ROI") || rest.contains("cli") {
        return Err(not_candidate("ROI or center-line image"));
    }

    let (modality, stamp) = match rest.strip_prefix(IR_SEGMENT) {
        Some(stamp) => (Modality::Infrared, stamp),
        None => (Modality::Visible, rest),
    };
    let timestamp = parse_stamp(stamp).ok_or_else(|| ParseError::MalformedTimestamp {
        name: filename.to_string(),
    })?;

    Ok(Identity::new(site, modality, timestamp))
}

/// True when `ts` fits the four-digit year of the naming scheme.
pub fn representable(ts: NaiveDateTime) -> bool {
    (0..=9999).contains(&ts.year())
}

/// Render an identity back into its canonical filename.
pub fn render(identity: &Identity) -> String {
    let ir = match identity.modality {
        Modality::Infrared => IR_SEGMENT,
        Modality::Visible => "",
    };
    format!(
        "{}_{}{}.{}",
        identity.site,
        ir,
        identity.timestamp.format(STAMP_FORMAT),
        IMAGE_EXTENSION
    )
}

fn parse_stamp(stamp: &str) -> Option<NaiveDateTime> {
    let bytes = stamp.as_bytes();
    if bytes.len() != STAMP_LEN {
        return None;
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| {
        if STAMP_SEPARATORS.contains(&i) {
            *b == b'_'
        } else {
            b.is_ascii_digit()
        }
    });
    if !shape_ok {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
}
