//! Join-style work queue shared by the probe workers.
//!
//! Tracks an *unfinished* count alongside the FIFO: an item counts as
//! unfinished from `enqueue` until its `mark_done`. Drainage therefore
//! means "empty and nothing in flight", not merely "empty".

use crate::error::QueueError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    unfinished: usize,
    closed: bool,
}

/// An ordered, internally synchronized queue of work items.
#[derive(Debug)]
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    item_ready: Notify,
    drained: Notify,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    /// Create an empty, open queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                unfinished: 0,
                closed: false,
            }),
            item_ready: Notify::new(),
            drained: Notify::new(),
        }
    }

    // A panicking worker never holds this lock, but recover the state anyway
    // so bookkeeping keeps working for the surviving workers.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an item at the tail.
    pub fn enqueue(&self, item: T) {
        {
            let mut state = self.lock();
            state.items.push_back(item);
            state.unfinished += 1;
        }
        self.item_ready.notify_one();
    }

    /// Remove the head item, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue has been closed and holds no more items.
    pub async fn dequeue(&self) -> Option<T> {
        loop {
            let notified = self.item_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(item) = state.items.pop_front() {
                    let more = !state.items.is_empty();
                    drop(state);
                    // Pass the wakeup on if we consumed a permit meant for several items
                    if more {
                        self.item_ready.notify_one();
                    }
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Acknowledge that one dequeued item has been fully processed.
    pub fn mark_done(&self) -> Result<(), QueueError> {
        let now_drained = {
            let mut state = self.lock();
            if state.unfinished == 0 {
                return Err(QueueError::TooManyDone);
            }
            state.unfinished -= 1;
            state.unfinished == 0
        };

        if now_drained {
            self.drained.notify_waiters();
        }
        Ok(())
    }

    /// Wait until every enqueued item has been dequeued and marked done.
    pub async fn wait_until_drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.lock().unfinished == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Refuse further waiting: idle consumers wake up and get `None`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.item_ready.notify_waiters();
    }

    /// Number of items waiting to be dequeued.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether no items are waiting to be dequeued.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Number of items enqueued but not yet marked done.
    pub fn unfinished(&self) -> usize {
        self.lock().unfinished
    }
}

impl<T> WorkQueue<T> {
    /// Dequeue an item together with a ticket that marks it done on drop.
    pub async fn take(self: &Arc<Self>) -> Option<(T, Ticket<T>)> {
        let item = self.dequeue().await?;
        Some((
            item,
            Ticket {
                queue: Arc::clone(self),
            },
        ))
    }
}

/// Completion guard for one dequeued item.
///
/// Dropping the ticket calls [`WorkQueue::mark_done`], including during
/// unwinding, so a failing worker can never leave the orchestrator waiting.
#[derive(Debug)]
pub struct Ticket<T> {
    queue: Arc<WorkQueue<T>>,
}

impl<T> Drop for Ticket<T> {
    fn drop(&mut self) {
        if let Err(e) = self.queue.mark_done() {
            tracing::error!("queue bookkeeping error: {}", e);
        }
    }
}
