use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::PacingError;

/// Cooperative cancellation flag shared between a worker thread and the
/// driver that stops the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Interruptible sleep sliced into `check_interval` chunks so a cancellation
/// is observed promptly. The slicing is deadline-based and does not stretch
/// the total wait on the uncancelled path. A caller running in a strictly
/// blocking environment can set the interval to the whole duration.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedSleeper {
    check_interval: Duration,
}

impl ChunkedSleeper {
    #[must_use]
    pub fn new(check_interval: Duration) -> Self {
        Self {
            check_interval: check_interval.max(Duration::from_millis(1)),
        }
    }

    /// Sleeps for `total`, waking every `check_interval` to observe `cancel`.
    ///
    /// # Errors
    ///
    /// Returns [`PacingError::Interrupted`] as soon as the token is seen set;
    /// the remaining wait is abandoned, never retried.
    pub fn sleep(&self, total: Duration, cancel: &CancelToken) -> Result<(), PacingError> {
        let deadline = Instant::now() + total;
        loop {
            if cancel.is_cancelled() {
                return Err(PacingError::Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            let remaining = deadline - now;
            std::thread::sleep(remaining.min(self.check_interval));
        }
    }
}
