//! Delayed delivery onto the UI event channel
//!
//! A scheduled task sleeps on a tokio timer and then posts its event into the
//! same channel the UI thread drains, so delayed work runs on the UI thread
//! like everything else.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Posts events into a UI channel after a delay
#[derive(Debug)]
pub struct Scheduler<E> {
    tx: mpsc::UnboundedSender<E>,
}

impl<E> Clone for Scheduler<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Send + 'static> Scheduler<E> {
    /// Schedule onto `tx`
    pub fn new(tx: mpsc::UnboundedSender<E>) -> Self {
        Self { tx }
    }

    /// Post `event` after `delay`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, delay: Duration, event: E) -> ScheduledTask {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the UI loop shut down
            let _ = tx.send(event);
        });
        ScheduledTask {
            abort: handle.abort_handle(),
        }
    }
}

/// Handle for one pending delayed event
///
/// Dropping the handle leaves the timer running; use [`cancel`](Self::cancel).
#[derive(Debug)]
pub struct ScheduledTask {
    abort: AbortHandle,
}

impl ScheduledTask {
    /// Cancel the timer if it has not fired yet
    pub fn cancel(self) {
        self.abort.abort();
    }

    /// Whether the timer is still waiting
    pub fn is_pending(&self) -> bool {
        !self.abort.is_finished()
    }
}
