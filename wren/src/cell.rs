use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use wren_api::{ActorId, ActorState};

use crate::mailbox::Mailbox;
use crate::processor::Processor;

/// Runtime record of one actor, owned by the system's arena.
///
/// The arena holds the only strong references to cells besides the
/// short-lived clones taken while delivering or stepping, so handles held
/// in cycles never keep an actor alive.
pub(crate) struct ActorCell {
    pub(crate) id: ActorId,
    pub(crate) name: Arc<str>,
    state: AtomicU8,
    pub(crate) mailbox: Mailbox,
    /// Set while the actor is queued or running. Whoever flips it to true
    /// owns the next step.
    scheduled: AtomicBool,
    /// Empty while starting and after termination.
    pub(crate) processor: Mutex<Option<Box<dyn Processor>>>,
}

impl ActorCell {
    /// A starting cell. It is created claimed, so deliveries made during
    /// `make_behavior` queue up without scheduling the actor.
    pub(crate) fn starting(id: ActorId, name: Arc<str>) -> Self {
        Self {
            id,
            name,
            state: AtomicU8::new(ActorState::Starting.as_u8()),
            mailbox: Mailbox::new(),
            scheduled: AtomicBool::new(true),
            processor: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> ActorState {
        ActorState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: ActorState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Takes the scheduling claim. Returns false if someone holds it.
    pub(crate) fn claim(&self) -> bool {
        self.scheduled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.scheduled.store(false, Ordering::SeqCst);
    }

    /// Takes the claim for good, regardless of who held it.
    pub(crate) fn seal(&self) {
        self.scheduled.store(true, Ordering::SeqCst);
    }
}

impl fmt::Debug for ActorCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCell")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("mailbox", &self.mailbox.len())
            .field("scheduled", &self.scheduled.load(Ordering::Relaxed))
            .finish()
    }
}
