//! Icon and digit detection on top of the template matcher.

mod digits;
mod icons;

pub use digits::{DigitDetection, DigitDetector};
pub use icons::{IconDetection, IconDetector, IconSearchStats};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and a running search.
///
/// The icon detector checks the flag before evaluating each item group and
/// aborts with [`StockMatchError::Cancelled`](crate::StockMatchError::Cancelled).
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every search holding this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
