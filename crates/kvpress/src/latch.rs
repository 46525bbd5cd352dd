//! Countdown latch used to detect batch completion.
//!
//! A [`CompletionLatch`] is created per phase with the number of jobs in the
//! batch. Every job decrements it exactly once after its execution attempt,
//! and the driver waits until the count reaches zero.
//!
//! The count lives in an atomic; the wait uses [`Notify`] with the waiter
//! registered *before* the count is re-checked, so a decrement racing with
//! the check cannot be lost.

use core::pin::pin;
use portable_atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// An async countdown latch.
///
/// # Example
/// ```
/// use kvpress::CompletionLatch;
///
/// let latch = CompletionLatch::new(2);
/// latch.count_down();
/// assert_eq!(latch.remaining(), 1);
/// latch.count_down();
/// assert!(latch.is_released());
/// ```
#[derive(Debug)]
pub struct CompletionLatch {
    remaining: AtomicUsize,
    notify: Notify,
}

impl CompletionLatch {
    /// Creates a latch that releases after `count` calls to
    /// [`count_down`](Self::count_down). A latch created with `0` is already
    /// released.
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        }
    }

    /// Records one completed job. Wakes every waiter when the count hits zero.
    ///
    /// Calling this on a released latch is a caller bug; the count saturates
    /// at zero instead of wrapping.
    pub fn count_down(&self) {
        match self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => self.notify.notify_waiters(),
            Ok(_) => {}
            Err(_) => {
                debug_assert!(false, "count_down called on a released latch");
                #[cfg(feature = "tracing")]
                tracing::warn!("count_down called on a released latch");
            }
        }
    }

    /// Number of jobs that have not yet completed.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_released(&self) -> bool {
        self.remaining() == 0
    }

    /// Waits until the count reaches zero. Returns immediately if it already
    /// has.
    pub async fn wait(&self) {
        loop {
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            if self.is_released() {
                return;
            }

            notified.await;
        }
    }
}
