//! Global limiter for concurrent page fetches

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Bounds how many page fetches run at once across all monitors.
///
/// Rendering a page is expensive; capacity 1 serializes fetches entirely,
/// trading polling latency for a bounded footprint on the host.
#[derive(Debug, Clone)]
pub struct FetchThrottle {
    semaphore: Arc<Semaphore>,
}

impl FetchThrottle {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Wait for a fetch slot. Returns `None` if cancellation fires first.
    /// The permit frees its slot when dropped, on every exit path.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<OwnedSemaphorePermit> {
        tokio::select! {
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
            _ = cancel.cancelled() => None,
        }
    }
}
