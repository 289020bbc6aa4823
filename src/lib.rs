//! pheno_offset: correct the timestamps of a site's images after a camera clock error.
//!
//! Pipeline: walk the site directory (`discover`) -> parse names (`codec`) into
//! records -> select and compose them as a `Mask` -> `Relocator` applies the
//! shift and moves each image and its `.meta` file into
//! `<root>/<site>/<YYYY>/<MM>/`, reporting one outcome per file.
//!
//! The library never exits the process and never aborts a batch on a per-file
//! problem; only invalid requests (bad dates, bad offset, missing site) are errors.

pub mod cli;
pub mod codec;
pub mod config;
pub mod discover;
pub mod errors;
pub mod fs_ops;
pub mod mask;
pub mod output;
pub mod record;
pub mod relocate;
pub mod resolve;
pub mod shift;
pub mod shutdown;
pub mod window;

pub use config::{
    create_template_config, default_config_path, default_log_path, load_config, load_config_from_xml_path,
    path_has_symlink_ancestor, Config, Job, LogLevel,
};
pub use errors::{ParseError, PhenoOffsetError, RangeError, ShiftError};
pub use fs_ops::{FileStore, LocalStore};
pub use mask::{Collision, CollisionKind, Gathered, Mask};
pub use record::{Identity, Modality, Record};
pub use relocate::{
    FileRole, OutcomeKind, RelocateOptions, RelocationOutcome, RelocationReport, Relocator, ResumeBound, Selector,
    Tally, Unprocessed,
};
pub use resolve::{resolve, Destination};
pub use shift::Shift;
pub use shutdown::ShutdownFlag;
pub use window::SelectionWindow;

/// Convenient glob import for callers and tests.
pub mod prelude {
    pub use crate::codec::{parse, render};
    pub use crate::discover::scan_site;
    pub use crate::{
        Config, Destination, FileRole, FileStore, Identity, LocalStore, Mask, Modality, OutcomeKind,
        RelocateOptions, RelocationReport, Relocator, Record, SelectionWindow, Selector, Shift, ShutdownFlag,
        resolve,
    };
    pub use crate::errors::PhenoOffsetError as Error;

    pub type PoResult<T> = anyhow::Result<T>;
}
