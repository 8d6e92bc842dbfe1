//! Per-actor mailbox.
//!
//! Two FIFO lanes behind one short lock: the *system* lane (exit commands,
//! down notifications) is always drained before the *user* lane (messages,
//! responses). Any thread may enqueue; only the worker holding the actor's
//! scheduled flag dequeues.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::envelope::Envelope;
use crate::sync::lock;

#[derive(Debug, Default)]
struct Lanes {
    system: VecDeque<Envelope>,
    user: VecDeque<Envelope>,
    closed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Mailbox {
    lanes: Mutex<Lanes>,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends to the lane matching the envelope's tag.
    ///
    /// Never blocks on the consumer. A closed mailbox hands the envelope
    /// back so the caller can answer its reply route.
    pub(crate) fn enqueue(&self, envelope: Envelope) -> Result<(), Envelope> {
        let mut lanes = lock(&self.lanes);
        if lanes.closed {
            return Err(envelope);
        }
        if envelope.tag.is_control() {
            lanes.system.push_back(envelope);
        } else {
            lanes.user.push_back(envelope);
        }
        Ok(())
    }

    /// Next envelope, system lane first.
    pub(crate) fn dequeue(&self) -> Option<Envelope> {
        let mut lanes = lock(&self.lanes);
        lanes.system.pop_front().or_else(|| lanes.user.pop_front())
    }

    pub(crate) fn dequeue_system(&self) -> Option<Envelope> {
        lock(&self.lanes).system.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn has_system(&self) -> bool {
        !lock(&self.lanes).system.is_empty()
    }

    pub(crate) fn is_empty(&self) -> bool {
        let lanes = lock(&self.lanes);
        lanes.system.is_empty() && lanes.user.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        let lanes = lock(&self.lanes);
        lanes.system.len() + lanes.user.len()
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        lock(&self.lanes).closed
    }

    /// Closes the mailbox and returns everything still queued, system lane
    /// first. Later enqueues fail.
    pub(crate) fn close(&self) -> Vec<Envelope> {
        let mut lanes = lock(&self.lanes);
        lanes.closed = true;
        let mut drained: Vec<Envelope> = lanes.system.drain(..).collect();
        drained.extend(lanes.user.drain(..));
        drained
    }
}
