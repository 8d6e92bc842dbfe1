//! # Scheduler
//!
//! Actors do not own threads. An actor with work is put on the
//! [`ReadyQueue`](queue::ReadyQueue) once; a worker pops it and runs exactly
//! one step: one handler, one continuation or one control message. If more
//! work is ready the actor goes back to the tail of the queue, so busy
//! actors take turns.
//!
//! ## Exclusivity
//! The cell's `scheduled` flag is taken with a compare-and-swap before an
//! actor is queued and released after its step. Only the holder of the
//! flag touches the actor, so handlers never run concurrently for one
//! actor and the per-cell processor mutex is never contended.
//!
//! ## Starvation
//! Execution is cooperative. A handler that blocks or computes for a long
//! time holds its worker for the whole duration; with every worker busy
//! that way, no other actor makes progress. Long work belongs on a thread
//! of its own, answered through a response promise.

pub(crate) mod queue;
pub(crate) mod worker;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::trace;
use wren_api::{ActorId, ExitReason};

use crate::actor_span;
use crate::log_error;
use crate::processor::{Cleanup, Step};
use crate::sync::lock;
use crate::system::SystemInner;

/// Runs one step of actor `id`. The caller must hold its scheduling claim,
/// which the step either hands back to the queue or releases.
pub(crate) fn run_step(system: &Arc<SystemInner>, id: ActorId) {
    let Some(cell) = system.cell(id) else {
        // Removed by an immediate shutdown.
        return;
    };
    let span = actor_span!(&*cell.name, id.as_u64());
    let _enter = span.enter();

    let mut slot = lock(&cell.processor);
    let Some(processor) = slot.as_mut() else {
        return;
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| processor.step(&cell.mailbox)));
    let exit = match outcome {
        Ok(Step::Stop(reason)) => Some(reason),
        Ok(Step::Ran) | Ok(Step::Idle) => None,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log_error!(message, actor = %id, "handler panicked");
            Some(ExitReason::Panicked(message))
        }
    };

    match exit {
        Some(reason) => {
            let processor = slot.take();
            drop(slot);
            if let Some(processor) = processor {
                system.terminate(&cell, processor, reason, Cleanup::Graceful);
            }
            // The claim dies with the actor.
            system.claim_finished();
        }
        None => {
            let more = processor.has_ready_work(&cell.mailbox);
            drop(slot);
            trace!(more, "step finished");
            system.reschedule(&cell, more);
        }
    }
}

/// Readable text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extracts_strings() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload = panic::catch_unwind(|| panic!("count {}", 3)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "count 3");

        let payload = panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
