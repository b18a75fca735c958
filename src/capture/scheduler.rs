//! Time source and the cancellable deferred finalize.
//!
//! The orchestrator is single-threaded, so the auto-finalize after loop
//! detection is a deadline rather than a timer thread: the caller drives it by
//! calling `poll`. Cancelling clears the deadline, so a finalize scheduled for
//! an abandoned trail can never fire.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Delay between loop detection and automatic finalization.
pub const AUTO_FINALIZE_DELAY_MS: i64 = 500;

/// Millisecond wall clock.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// At most one pending finalize deadline.
#[derive(Debug, Default)]
pub struct FinalizeTimer {
    due_at_ms: Option<i64>,
}

impl FinalizeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a finalize `delay_ms` after `now_ms`, replacing any pending one.
    pub fn schedule(&mut self, now_ms: i64, delay_ms: i64) {
        self.due_at_ms = Some(now_ms + delay_ms);
    }

    /// Drop the pending finalize. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due_at_ms.take().is_some()
    }

    /// Clear the pending finalize and return true if it is due at `now_ms`.
    pub fn take_due(&mut self, now_ms: i64) -> bool {
        match self.due_at_ms {
            Some(due) if due <= now_ms => {
                self.due_at_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due_at_ms.is_some()
    }

    /// When the pending finalize becomes due.
    pub fn deadline(&self) -> Option<i64> {
        self.due_at_ms
    }
}
