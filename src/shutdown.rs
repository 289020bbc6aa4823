//! Cooperative cancellation.
//! The binary's signal handler requests a stop; the relocator checks the flag
//! before each record, so a run only ever stops between two records.
//!
//! Notes:
//! - Relaxed atomics are sufficient for a one-way "stop" flag.
//! - Clones share the same flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop (idempotent, safe from a signal handler).
    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = ShutdownFlag::new();
        let handler_copy = flag.clone();
        assert!(!flag.is_requested());
        handler_copy.request();
        assert!(flag.is_requested());
    }
}
