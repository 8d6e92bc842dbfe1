//! Dispatcher and termination for a single actor.
//!
//! [`ActorCore`] bundles an actor with its behavior and context. The
//! scheduler only sees it through the type-erased [`Processor`] trait and
//! advances it one [`Step`] at a time: one handler, one continuation, or one
//! control message.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};
use wren_api::errors::ActorError;
use wren_api::{ActorId, ExitReason};

use crate::actor::Actor;
use crate::behavior::Behavior;
use crate::context::Context;
use crate::envelope::{Body, Envelope, PayloadTag};
use crate::mailbox::Mailbox;
use crate::message_span;

/// Outcome of one scheduling step.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Nothing runnable; envelopes may have been moved to the stash.
    Idle,
    /// One unit of work ran.
    Ran,
    /// The actor must terminate.
    Stop(ExitReason),
}

/// How queued requests are answered when an actor terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cleanup {
    /// `ActorNotFound`: the target is gone.
    Graceful,
    /// `PromiseOrphaned`: the runtime stopped before the request could run.
    Orphan,
}

impl Cleanup {
    fn error(self, id: ActorId) -> ActorError {
        match self {
            Cleanup::Graceful => ActorError::ActorNotFound(id),
            Cleanup::Orphan => ActorError::PromiseOrphaned { owner: Some(id) },
        }
    }
}

/// Type-erased view of an actor used by the scheduler.
pub(crate) trait Processor: Send {
    fn step(&mut self, mailbox: &Mailbox) -> Step;

    /// Whether another step would do something.
    fn has_ready_work(&self, mailbox: &Mailbox) -> bool;

    /// Cleanup steps one to three: drain, orphan, finalizer. Returns the
    /// actor's remains, which the caller drops after unregistering it.
    fn finalize(self: Box<Self>, reason: &ExitReason, cleanup: Cleanup, mailbox: &Mailbox) -> Box<dyn Send>;
}

pub(crate) struct ActorCore<A: Actor> {
    actor: A,
    behavior: Behavior<A>,
    ctx: Context<A>,
    /// False when `make_behavior` failed; such an actor never ran and its
    /// finalizer is skipped.
    started: bool,
}

impl<A: Actor> ActorCore<A> {
    pub(crate) fn new(actor: A, behavior: Behavior<A>, ctx: Context<A>) -> Self {
        Self {
            actor,
            behavior,
            ctx,
            started: true,
        }
    }

    /// An actor whose start failed, kept only to be cleaned up.
    pub(crate) fn stillborn(actor: A, ctx: Context<A>) -> Self {
        Self {
            started: false,
            ..Self::new(actor, Behavior::new(), ctx)
        }
    }

    fn next_envelope(&mut self, mailbox: &Mailbox) -> Option<Envelope> {
        if let Some(envelope) = mailbox.dequeue_system() {
            return Some(envelope);
        }

        if self.ctx.awaiting.is_empty() {
            return match self.ctx.stash.pop_front() {
                Some(envelope) => Some(envelope),
                None => mailbox.dequeue(),
            };
        }

        while let Some(envelope) = mailbox.dequeue() {
            if envelope.tag.is_control() || self.ctx.is_awaited(&envelope) {
                return Some(envelope);
            }
            self.ctx.stash.push_back(envelope);
        }
        None
    }

    fn handle(&mut self, envelope: Envelope) -> Step {
        let Envelope {
            sender,
            tag,
            body,
            correlation,
            reply_to,
        } = envelope;

        match body {
            Body::Exit(reason) => {
                drop(reply_to);
                return Step::Stop(reason);
            }
            Body::Down(note) => {
                self.ctx.begin(sender, None);
                self.actor.on_down(note, &mut self.ctx);
            }
            Body::Response(result) => {
                let pending = correlation.and_then(|correlation| self.ctx.take_pending(correlation));
                match pending {
                    Some(pending) => {
                        self.ctx.begin(sender, None);
                        (pending.continuation)(&mut self.actor, &mut self.ctx, result);
                    }
                    None => {
                        debug!(actor = %self.ctx.id(), ?correlation, "response without pending request dropped");
                        return Step::Ran;
                    }
                }
            }
            Body::Message(payload) => {
                let PayloadTag::Message(shape) = tag else {
                    return Step::Ran;
                };
                let span = message_span!(shape.name(), actor = %self.ctx.id());
                let _guard = span.enter();

                self.ctx.begin(sender, reply_to);
                if self
                    .behavior
                    .dispatch(&shape, &mut self.actor, &mut self.ctx, payload)
                    .is_err()
                {
                    let error = ActorError::UnexpectedMessageKind {
                        actor: self.ctx.id(),
                        message: shape.name(),
                    };
                    warn!(error = %error, "message dropped");
                    self.ctx.reply_with(Err(error));
                }
            }
        }

        self.ctx.finish();
        if let Some(behavior) = self.ctx.next_behavior.take() {
            debug!(actor = %self.ctx.id(), entries = behavior.len(), "behavior switched");
            self.behavior = behavior;
        }
        match self.ctx.stop_reason.take() {
            Some(reason) => Step::Stop(reason),
            None => Step::Ran,
        }
    }
}

impl<A: Actor> Processor for ActorCore<A> {
    fn step(&mut self, mailbox: &Mailbox) -> Step {
        if let Some(reason) = self.ctx.stop_reason.take() {
            return Step::Stop(reason);
        }
        match self.next_envelope(mailbox) {
            Some(envelope) => self.handle(envelope),
            None => Step::Idle,
        }
    }

    fn has_ready_work(&self, mailbox: &Mailbox) -> bool {
        self.ctx.stop_reason.is_some()
            || !mailbox.is_empty()
            || (self.ctx.awaiting.is_empty() && !self.ctx.stash.is_empty())
    }

    fn finalize(self: Box<Self>, reason: &ExitReason, cleanup: Cleanup, mailbox: &Mailbox) -> Box<dyn Send> {
        let ActorCore {
            mut actor,
            behavior,
            mut ctx,
            started,
        } = *self;
        let id = ctx.id();

        // 1. Close and drain; every queued request learns the actor is gone.
        let mut drained: Vec<Envelope> = ctx.stash.drain(..).collect();
        drained.extend(mailbox.close());
        let mut answered = 0usize;
        for envelope in drained {
            if let Some(reply) = envelope.reply_to {
                reply.respond(Some(id), Err(cleanup.error(id)));
                answered += 1;
            }
        }
        if let Some(reply) = ctx.take_reply() {
            // The request whose handler was running when the actor failed.
            let error = match reason {
                ExitReason::Panicked(msg) => ActorError::handling(format!("actor {} panicked: {}", id, msg)),
                _ => cleanup.error(id),
            };
            reply.respond(Some(id), Err(error));
            answered += 1;
        }
        for (_, pending) in ctx.pending.drain() {
            if let Some(timer) = pending.timer {
                timer.abort();
            }
        }
        ctx.awaiting.clear();

        // 2. Orphan outstanding response promises.
        for slot in ctx.promises.drain(..) {
            if let Some(slot) = slot.upgrade() {
                slot.orphan();
            }
        }

        // 3. Finalizer.
        if started && panic::catch_unwind(AssertUnwindSafe(|| actor.on_exit(reason, &mut ctx))).is_err() {
            warn!(actor = %id, name = ctx.name(), "on_exit panicked");
        }
        ctx.finish();

        debug!(actor = %id, answered, "mailbox drained");
        Box::new((actor, behavior, ctx))
    }
}
