//! # Actor Context
//!
//! Every actor owns one [`Context`]. Handlers receive it next to the actor
//! state and use it to talk to the rest of the system: send and request,
//! spawn and monitor other actors, make response promises, switch behavior
//! and stop.
//!
//! ## Sub-requests
//!
//! [`Context::request`] returns a [`RequestBuilder`] that ends in one of
//! two continuation styles:
//!
//! - [`then`](RequestBuilder::then): fire and continue. Other messages may
//!   be handled before the continuation runs.
//! - [`await_response`](RequestBuilder::await_response): suspend until
//!   answered. Until the continuation has run, every other user message and
//!   every non-awaited response is stashed; the stash is replayed in order
//!   before newer mailbox contents. Exit and down notifications still get
//!   through.
//!
//! Both continuations run on the actor's own execution, after the response
//! re-entered through its mailbox.

use std::any::type_name;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::debug;
use wren_api::errors::ActorError;
use wren_api::interface::{Accepts, Interface};
use wren_api::types::{ActorResult, BoxedMessage};
use wren_api::{ActorId, Addressable, CorrelationId, ExitReason, Handle, Message};

use crate::actor::Actor;
use crate::behavior::Behavior;
use crate::diagnostics::Diagnostic;
use crate::envelope::{Envelope, PayloadTag};
use crate::error::SpawnError;
use crate::promise::{ResponsePromise, ResponseSlot};
use crate::reply::ReplyTo;
use crate::system::{Origin, SystemInner};

pub(crate) type Continuation<A> =
    Box<dyn FnOnce(&mut A, &mut Context<A>, ActorResult<BoxedMessage>) + Send>;

pub(crate) struct PendingRequest<A: Actor> {
    pub(crate) continuation: Continuation<A>,
    pub(crate) timer: Option<AbortHandle>,
}

/// Execution context of an actor.
pub struct Context<A: Actor> {
    id: ActorId,
    name: Arc<str>,
    system: Weak<SystemInner>,
    /// Sender of the envelope being handled.
    sender: Option<ActorId>,
    /// Reply route of the request being handled.
    reply: Option<ReplyTo>,
    pub(crate) pending: HashMap<CorrelationId, PendingRequest<A>>,
    pub(crate) awaiting: HashSet<CorrelationId>,
    pub(crate) stash: VecDeque<Envelope>,
    pub(crate) promises: Vec<Weak<ResponseSlot>>,
    pub(crate) next_behavior: Option<Behavior<A>>,
    pub(crate) stop_reason: Option<ExitReason>,
}

impl<A: Actor> Context<A> {
    pub(crate) fn new(id: ActorId, name: Arc<str>, system: Weak<SystemInner>) -> Self {
        Self {
            id,
            name,
            system,
            sender: None,
            reply: None,
            pending: HashMap::new(),
            awaiting: HashSet::new(),
            stash: VecDeque::new(),
            promises: Vec::new(),
            next_behavior: None,
            stop_reason: None,
        }
    }

    /// This actor's id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Typed handle to this actor, to pass to others.
    pub fn handle(&self) -> Handle<A::Interface> {
        Handle::from_spawned(self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sender of the message being handled, if it came from an actor.
    pub fn sender(&self) -> Option<ActorId> {
        self.sender
    }

    /// Whether an `await_response` continuation is still outstanding.
    pub fn is_awaiting(&self) -> bool {
        !self.awaiting.is_empty()
    }

    fn system(&self) -> Result<Arc<SystemInner>, ActorError> {
        self.system.upgrade().ok_or(ActorError::SchedulerShuttingDown)
    }

    /// One-way send.
    ///
    /// # Errors
    /// `ActorNotFound` if the target has terminated.
    pub fn send<I, M>(&self, to: Handle<I>, msg: M) -> Result<(), ActorError>
    where
        I: Accepts<M>,
        M: Message,
    {
        let system = self.system()?;
        let envelope = Envelope::message(Some(self.id), msg, None);
        system.deliver(to.id(), envelope, Origin::Actor)
    }

    /// Starts a request; finish it with `then` or `await_response`.
    pub fn request<I, M>(&mut self, to: Handle<I>, msg: M) -> RequestBuilder<'_, A, M>
    where
        I: Accepts<M>,
        M: Message,
    {
        RequestBuilder {
            ctx: self,
            target: to.id(),
            msg,
            timeout: None,
        }
    }

    /// Spawns another actor.
    pub fn spawn<B: Actor>(&self, actor: B) -> Result<Handle<B::Interface>, SpawnError> {
        self.spawn_with(move || actor)
    }

    /// Spawns another actor built by `constructor`.
    pub fn spawn_with<B, F>(&self, constructor: F) -> Result<Handle<B::Interface>, SpawnError>
    where
        B: Actor,
        F: FnOnce() -> B,
    {
        let system = self.system.upgrade().ok_or(SpawnError::SystemShutdown)?;
        system.spawn_actor(constructor, Origin::Actor)
    }

    /// Spawns another actor and monitors it.
    pub fn spawn_monitored<B: Actor>(&self, actor: B) -> Result<Handle<B::Interface>, SpawnError> {
        let handle = self.spawn(actor)?;
        self.monitor(&handle);
        Ok(handle)
    }

    /// Requests a `Down` notification when `target` terminates. Repeated
    /// calls for the same target have no further effect.
    pub fn monitor(&self, target: &impl Addressable) {
        if let Some(system) = self.system.upgrade() {
            system.monitor(self.id, target.actor_id());
        }
    }

    pub fn demonitor(&self, target: &impl Addressable) {
        if let Some(system) = self.system.upgrade() {
            system.demonitor(self.id, target.actor_id());
        }
    }

    /// Asks another actor to stop.
    pub fn stop_actor(&self, target: &impl Addressable, reason: ExitReason) -> Result<(), ActorError> {
        let system = self.system()?;
        system.stop_actor(target.actor_id(), Some(self.id), reason)
    }

    /// Stops this actor with `ExitReason::Normal` once the current handler
    /// returns.
    pub fn stop(&mut self) {
        self.quit(ExitReason::Normal);
    }

    /// Stops this actor with `reason` once the current handler returns.
    pub fn quit(&mut self, reason: ExitReason) {
        if self.stop_reason.is_none() {
            self.stop_reason = Some(reason);
        }
    }

    /// Takes over the answer to the request being handled.
    ///
    /// Outside a request (one-way send, continuation) the promise has no
    /// route and delivering to it is a no-op.
    pub fn make_response_promise<R: Send + 'static>(&mut self) -> ResponsePromise<R> {
        let promise = ResponsePromise::new(self.id, self.reply.take());
        self.promises.retain(|slot| slot.strong_count() > 0);
        self.promises.push(promise.downgrade());
        promise
    }

    /// Replaces the behavior after the current handler returns.
    ///
    /// # Errors
    /// `IncompleteBehavior` if `behavior` misses messages of the actor's
    /// interface; the current behavior stays in place.
    pub fn switch_behavior(&mut self, behavior: Behavior<A>) -> Result<(), ActorError> {
        let missing = behavior.missing(&A::Interface::shapes());
        if !missing.is_empty() {
            return Err(ActorError::IncompleteBehavior { missing });
        }
        self.next_behavior = Some(behavior);
        Ok(())
    }

    // --- dispatcher plumbing ---

    pub(crate) fn begin(&mut self, sender: Option<ActorId>, reply: Option<ReplyTo>) {
        self.sender = sender;
        self.reply = reply;
    }

    /// Clears per-envelope state. An unanswered reply route is orphaned.
    pub(crate) fn finish(&mut self) {
        self.sender = None;
        if let Some(reply) = self.reply.take() {
            reply.respond(Some(self.id), Err(ActorError::PromiseOrphaned { owner: Some(self.id) }));
        }
    }

    pub(crate) fn has_open_reply(&self) -> bool {
        self.reply.is_some()
    }

    pub(crate) fn take_reply(&mut self) -> Option<ReplyTo> {
        self.reply.take()
    }

    /// Answers the request being handled. A failure without a requester is
    /// recorded as a diagnostic.
    pub(crate) fn reply_with(&mut self, result: ActorResult<BoxedMessage>) {
        match self.reply.take() {
            Some(reply) => reply.respond(Some(self.id), result),
            None => {
                if let Err(error) = result {
                    if let Some(system) = self.system.upgrade() {
                        system.record(Diagnostic::new(
                            Some(self.id),
                            error,
                            "one-way message failed",
                        ));
                    }
                }
            }
        }
    }

    pub(crate) fn is_awaited(&self, envelope: &Envelope) -> bool {
        envelope.tag == PayloadTag::Response
            && envelope
                .correlation
                .map_or(false, |correlation| self.awaiting.contains(&correlation))
    }

    pub(crate) fn take_pending(&mut self, correlation: CorrelationId) -> Option<PendingRequest<A>> {
        self.awaiting.remove(&correlation);
        let pending = self.pending.remove(&correlation)?;
        if let Some(timer) = &pending.timer {
            timer.abort();
        }
        Some(pending)
    }

    fn issue<M: Message>(
        &mut self,
        target: ActorId,
        msg: M,
        timeout: Option<Duration>,
        continuation: Continuation<A>,
        awaited: bool,
    ) {
        let correlation = CorrelationId::next();
        let system = match self.system.upgrade() {
            Some(system) => system,
            None => {
                debug!(actor = %self.id, "request dropped, system is gone");
                return;
            }
        };

        let timer = timeout
            .or(system.config().default_request_timeout)
            .and_then(|deadline| {
                let weak = self.system.clone();
                let requester = self.id;
                system.timers().schedule(deadline, move || {
                    if let Some(system) = weak.upgrade() {
                        system.deliver_response(
                            requester,
                            None,
                            correlation,
                            Err(ActorError::TimedOut(deadline)),
                        );
                    }
                })
            });

        self.pending.insert(correlation, PendingRequest { continuation, timer });
        if awaited {
            self.awaiting.insert(correlation);
        }

        let reply = ReplyTo::actor(self.system.clone(), self.id, correlation);
        let envelope = Envelope::message(Some(self.id), msg, Some(reply));
        // A refused envelope answers its reply route, so the continuation
        // still runs, with `ActorNotFound`.
        let _ = system.deliver(target, envelope, Origin::Actor);
    }
}

impl<A: Actor> fmt::Debug for Context<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("pending", &self.pending.len())
            .field("awaiting", &self.awaiting.len())
            .field("stash", &self.stash.len())
            .finish()
    }
}

/// A request being prepared from inside an actor.
#[must_use = "a request is only sent by `then` or `await_response`"]
pub struct RequestBuilder<'a, A: Actor, M: Message> {
    ctx: &'a mut Context<A>,
    target: ActorId,
    msg: M,
    timeout: Option<Duration>,
}

impl<'a, A: Actor, M: Message> RequestBuilder<'a, A, M> {
    /// Fails the request with `TimedOut` if no answer arrives within `deadline`.
    pub fn timeout(mut self, deadline: Duration) -> Self {
        self.timeout = Some(deadline);
        self
    }

    /// Sends the request; `continuation` runs when the answer arrives.
    /// Other messages may be handled in between.
    pub fn then<F>(self, continuation: F)
    where
        F: FnOnce(&mut A, &mut Context<A>, ActorResult<M::Result>) + Send + 'static,
    {
        self.finish(continuation, false);
    }

    /// Sends the request and suspends regular message handling until
    /// `continuation` has run.
    pub fn await_response<F>(self, continuation: F)
    where
        F: FnOnce(&mut A, &mut Context<A>, ActorResult<M::Result>) + Send + 'static,
    {
        self.finish(continuation, true);
    }

    fn finish<F>(self, continuation: F, awaited: bool)
    where
        F: FnOnce(&mut A, &mut Context<A>, ActorResult<M::Result>) + Send + 'static,
    {
        let erased: Continuation<A> = Box::new(move |actor, ctx, result| {
            let typed = result.and_then(|payload| {
                payload
                    .downcast::<M::Result>()
                    .map(|value| *value)
                    .map_err(|_| ActorError::ReplyTypeMismatch {
                        expected: type_name::<M::Result>(),
                    })
            });
            continuation(actor, ctx, typed);
        });
        self.ctx
            .issue(self.target, self.msg, self.timeout, erased, awaited);
    }
}
