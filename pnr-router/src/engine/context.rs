//! Per-request deadline and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::warn;

/// Shared state of one routing request.
///
/// The search loop calls [`should_stop`](Self::should_stop) once per
/// iteration. Cancellation is advisory: another thread may call
/// [`cancel`](Self::cancel) and the loop notices on its next check.
#[derive(Debug, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    aborted: AtomicBool,
    timed_out: AtomicBool,
}

impl RequestContext {
    pub fn new(deadline: Option<Instant>) -> Self {
        Self {
            deadline,
            ..Self::default()
        }
    }

    /// A context with no deadline.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Some(Instant::now() + timeout))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Ask the running search to stop.
    pub fn cancel(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    /// Whether the search stopped because its deadline elapsed.
    pub fn timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Relaxed)
    }

    /// Check for cancellation or an elapsed deadline, recording a timeout.
    pub fn should_stop(&self) -> bool {
        if self.is_aborted() {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                if !self.timed_out.swap(true, Ordering::Relaxed) {
                    warn!("search deadline elapsed, aborting");
                }
                self.aborted.store(true, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }
}
