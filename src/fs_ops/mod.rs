//! Filesystem operations.
//! The relocation engine only touches the disk through `FileStore`.

mod atomic;
mod helpers;
mod lock;
mod store;

pub use atomic::try_atomic_move;
pub use helpers::{describe_io_error, io_error_with_help};
pub use lock::{SiteLock, acquire_site_lock, try_acquire_site_lock, LOCK_FILE_NAME};
pub use store::{FileStore, LocalStore};
