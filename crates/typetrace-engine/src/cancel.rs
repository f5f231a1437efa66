//! Cooperative cancellation for in-flight resolutions.
//!
//! A resolution is abortable between any two trace steps: the builder checks
//! the token before every emission and unwinds with the partial trace. No
//! shared state needs cleanup because the tree and symbol table are
//! read-only and the step log is private to one request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation handle.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect before the next step emission.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
