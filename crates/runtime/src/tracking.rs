use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether background collection is running.
///
/// Owned by whatever starts and stops collection. Everyone else gets a
/// read-only [`TrackingStatus`].
#[derive(Debug, Default)]
pub struct TrackingState {
    running: Arc<AtomicBool>,
}

/// Read-only view of a [`TrackingState`].
#[derive(Debug, Clone)]
pub struct TrackingStatus {
    running: Arc<AtomicBool>,
}

impl TrackingStatus {
    pub fn is_tracking(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Clears the running flag when dropped, including on panic.
#[derive(Debug)]
pub struct TrackingGuard {
    running: Arc<AtomicBool>,
}

impl Drop for TrackingGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl TrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TrackingStatus {
        TrackingStatus {
            running: self.running.clone(),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Marks collection as running until the returned guard is dropped.
    pub fn start(&self) -> TrackingGuard {
        self.running.store(true, Ordering::Release);
        TrackingGuard {
            running: self.running.clone(),
        }
    }
}
