use std::fmt;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crossbeam_queue::SegQueue;
use wren_api::ActorId;

use crate::sync::lock;

/// FIFO of actors that have work ready.
///
/// Each id is in the queue at most once; the cell's `scheduled` flag is
/// the gate. Producers never block. Idle workers park on a condvar and are
/// woken by `push`.
pub(crate) struct ReadyQueue {
    /// Lock-free queue holding ready actors
    queue: SegQueue<ActorId>,

    /// Parking spot for idle workers. The mutex guards nothing but the
    /// condvar wait.
    parked: Mutex<()>,
    wakeup: Condvar,
}

impl ReadyQueue {
    pub(crate) fn new() -> Self {
        Self {
            queue: SegQueue::new(),
            parked: Mutex::new(()),
            wakeup: Condvar::new(),
        }
    }

    pub(crate) fn push(&self, id: ActorId) {
        self.queue.push(id);
        // Take the lock so a worker between its empty check and its wait
        // cannot miss the notification.
        let _guard = lock(&self.parked);
        self.wakeup.notify_one();
    }

    pub(crate) fn try_pop(&self) -> Option<ActorId> {
        self.queue.pop()
    }

    /// Pops an id, parking for at most `wait` when the queue is empty.
    pub(crate) fn pop_timeout(&self, wait: Duration) -> Option<ActorId> {
        if let Some(id) = self.try_pop() {
            return Some(id);
        }
        let guard = lock(&self.parked);
        if let Some(id) = self.try_pop() {
            return Some(id);
        }
        let (_guard, _timeout) = self
            .wakeup
            .wait_timeout(guard, wait)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.try_pop()
    }

    /// Wakes every parked worker, used when halting.
    pub(crate) fn wake_all(&self) {
        let _guard = lock(&self.parked);
        self.wakeup.notify_all();
    }

    /// Snapshot; may change by the time the value is used.
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl fmt::Debug for ReadyQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyQueue").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_fifo_order() {
        let queue = ReadyQueue::new();
        let ids: Vec<ActorId> = (0..3).map(|_| ActorId::next()).collect();
        for id in &ids {
            queue.push(*id);
        }
        assert_eq!(queue.len(), 3);
        let popped: Vec<ActorId> = std::iter::from_fn(|| queue.try_pop()).collect();
        assert_eq!(popped, ids);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_timeout_returns_none_when_idle() {
        let queue = ReadyQueue::new();
        let started = Instant::now();
        assert!(queue.pop_timeout(Duration::from_millis(20)).is_none());
        assert!(started.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_push_wakes_parked_worker() {
        let queue = Arc::new(ReadyQueue::new());
        let id = ActorId::next();

        let worker = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop_timeout(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(20));
        queue.push(id);

        assert_eq!(worker.join().unwrap(), Some(id));
    }
}
