//! # Actor System
//!
//! [`ActorSystem`] owns the actor arena, the ready queue, the worker pool,
//! the monitor registry and the timer driver. Actors reach the same state
//! through a weak reference held by their [`Context`], so nothing an actor
//! keeps can outlive the system.
//!
//! ## Lifecycle
//!
//! ```text
//! Running --shutdown(Graceful)--> Draining --> Stopping --> Stopped
//!    \____________shutdown(Immediate) or drop_____________/
//! ```
//!
//! While draining, new spawns and sends from outside the runtime are
//! refused; actors keep working until the system is quiescent. Every actor
//! is then stopped through its mailbox so its cleanup runs on a worker.
//!
//! ## Usage Example
//!
//! ```rust
//! use wren::prelude::*;
//!
//! #[derive(Message)]
//! #[message(result = "u64")]
//! struct Double(u64);
//!
//! interface! { pub Doubler { Double } }
//!
//! struct Twice;
//!
//! impl Actor for Twice {
//!     type Interface = Doubler;
//!
//!     fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
//!         Behavior::new().on(|_, _, Double(n): Double| Reply::Value(n * 2))
//!     }
//! }
//!
//! let system = ActorSystem::new(SystemConfig::default().with_pool_size(2)).unwrap();
//! let twice = system.spawn(Twice).unwrap();
//! assert_eq!(system.request(twice, Double(21), None).wait().unwrap(), 42);
//! system.shutdown(DrainPolicy::Graceful).unwrap();
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};
use wren_api::errors::ActorError;
use wren_api::interface::{Accepts, Interface};
use wren_api::types::{ActorResult, BoxedMessage};
use wren_api::{
    ActorId, ActorState, Addressable, CorrelationId, DownNotification, ExitReason, Handle, Message,
};

use crate::actor::Actor;
use crate::cell::ActorCell;
use crate::config::{DrainPolicy, SchedulingMode, SystemConfig};
use crate::context::Context;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::envelope::{Body, Envelope};
use crate::error::{SpawnError, SystemError};
use crate::processor::{ActorCore, Cleanup, Processor};
use crate::promise::{self, ResponseFuture};
use crate::reply::ReplyTo;
use crate::scheduler::queue::ReadyQueue;
use crate::scheduler::worker::WorkerPool;
use crate::scheduler::{panic_message, run_step};
use crate::supervision::{ExitHook, MonitorRegistry};
use crate::sync::{lock, read, write};
use crate::timer::TimerDriver;
use crate::{log_lifecycle, log_scheduler};

/// Status of an actor system. Only moves forward.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    Running = 0,
    /// Graceful shutdown started; outside callers are refused.
    Draining = 1,
    /// Actors are being stopped.
    Stopping = 2,
    Stopped = 3,
}

impl SystemStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SystemStatus::Running,
            1 => SystemStatus::Draining,
            2 => SystemStatus::Stopping,
            _ => SystemStatus::Stopped,
        }
    }
}

/// Who is asking the system to do something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Code outside the runtime. Refused once shutdown starts.
    External,
    /// An actor, through its context.
    Actor,
    /// The runtime itself: stop commands and down notifications.
    Runtime,
}

pub(crate) struct SystemInner {
    config: SystemConfig,
    status: AtomicU8,
    arena: RwLock<HashMap<ActorId, Arc<ActorCell>>>,
    queue: Arc<ReadyQueue>,
    /// Cells holding a scheduling claim: queued, running or starting.
    in_flight: AtomicUsize,
    registry: Mutex<MonitorRegistry>,
    diagnostics: DiagnosticsSink,
    timers: TimerDriver,
    workers: Mutex<Option<WorkerPool>>,
}

impl SystemInner {
    fn new(config: SystemConfig, timers: TimerDriver) -> Self {
        let diagnostics = DiagnosticsSink::new(config.diagnostics_capacity);
        Self {
            config,
            status: AtomicU8::new(SystemStatus::Running as u8),
            arena: RwLock::new(HashMap::new()),
            queue: Arc::new(ReadyQueue::new()),
            in_flight: AtomicUsize::new(0),
            registry: Mutex::new(MonitorRegistry::default()),
            diagnostics,
            timers,
            workers: Mutex::new(None),
        }
    }

    pub(crate) fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub(crate) fn timers(&self) -> &TimerDriver {
        &self.timers
    }

    fn status(&self) -> SystemStatus {
        SystemStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    fn set_status(&self, status: SystemStatus) {
        self.status.store(status as u8, Ordering::SeqCst);
    }

    fn transition(&self, from: SystemStatus, to: SystemStatus) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn admits(&self, origin: Origin) -> bool {
        match (origin, self.status()) {
            (_, SystemStatus::Running) => true,
            (Origin::External, _) => false,
            (_, SystemStatus::Draining) => true,
            _ => false,
        }
    }

    fn is_manual(&self) -> bool {
        self.config.scheduling_mode == SchedulingMode::Manual
    }

    pub(crate) fn cell(&self, id: ActorId) -> Option<Arc<ActorCell>> {
        read(&self.arena).get(&id).cloned()
    }

    fn live_actors(&self) -> usize {
        read(&self.arena).len()
    }

    pub(crate) fn record(&self, diagnostic: Diagnostic) {
        self.diagnostics.record(diagnostic);
    }

    // --- scheduling ---

    /// Queues `cell` unless it already holds a claim.
    fn schedule(&self, cell: &ActorCell) {
        // Counted before the claim so quiescence is never observed early.
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if cell.claim() {
            self.queue.push(cell.id);
        } else {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Hands the claim of `cell` back after a step.
    pub(crate) fn reschedule(&self, cell: &ActorCell, more: bool) {
        if more {
            self.queue.push(cell.id);
            return;
        }
        cell.release();
        // A sender may have enqueued after the last check and lost the race
        // for the claim.
        if !cell.mailbox.is_empty() {
            self.schedule(cell);
        }
        self.claim_finished();
    }

    pub(crate) fn claim_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn is_quiescent(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) == 0 && self.queue.is_empty()
    }

    fn run_until_idle(self: &Arc<Self>) -> usize {
        let mut steps = 0;
        while let Some(id) = self.queue.try_pop() {
            run_step(self, id);
            steps += 1;
        }
        steps
    }

    /// Like `run_until_idle`, but gives up at `until` so endless ping-pong
    /// cannot hold a shutdown forever.
    fn drive(self: &Arc<Self>, until: Instant) {
        while Instant::now() < until {
            match self.queue.try_pop() {
                Some(id) => run_step(self, id),
                None => return,
            }
        }
    }

    // --- spawning and termination ---

    pub(crate) fn spawn_actor<B, F>(
        self: &Arc<Self>,
        constructor: F,
        origin: Origin,
    ) -> Result<Handle<B::Interface>, SpawnError>
    where
        B: Actor,
        F: FnOnce() -> B,
    {
        if !self.admits(origin) {
            return Err(SpawnError::SystemShutdown);
        }
        let mut actor = panic::catch_unwind(AssertUnwindSafe(constructor)).map_err(|payload| {
            SpawnError::ConstructorPanicked {
                actor: type_name::<B>().to_string(),
                reason: panic_message(payload.as_ref()),
            }
        })?;

        let id = ActorId::next();
        let name: Arc<str> = Arc::from(actor.name());
        let cell = Arc::new(ActorCell::starting(id, name.clone()));
        // The starting cell holds its claim until the behavior is installed.
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        write(&self.arena).insert(id, cell.clone());

        let mut ctx = Context::new(id, name.clone(), Arc::downgrade(self));
        let made = panic::catch_unwind(AssertUnwindSafe(|| actor.make_behavior(&mut ctx)));
        let (error, reason) = match made {
            Ok(behavior) => {
                let missing = behavior.missing(&B::Interface::shapes());
                if missing.is_empty() {
                    let core = ActorCore::new(actor, behavior, ctx);
                    let ready = core.has_ready_work(&cell.mailbox);
                    *lock(&cell.processor) = Some(Box::new(core));
                    cell.set_state(ActorState::Running);
                    log_lifecycle!(&*name, id.as_u64(), "spawned", interface = B::Interface::name());
                    self.reschedule(&cell, ready);
                    return Ok(Handle::from_spawned(id));
                }
                let error = SpawnError::IncompleteBehavior {
                    actor: name.to_string(),
                    missing,
                };
                let reason = ExitReason::Custom(error.to_string());
                (error, reason)
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                let error = SpawnError::ConstructorPanicked {
                    actor: name.to_string(),
                    reason: reason.clone(),
                };
                (error, ExitReason::Panicked(reason))
            }
        };

        warn!(actor = %id, error = %error, "spawn failed");
        self.terminate(&cell, Box::new(ActorCore::stillborn(actor, ctx)), reason, Cleanup::Graceful);
        self.claim_finished();
        Err(error)
    }

    /// Finalizes an actor whose processor the caller took out of its cell,
    /// unregisters it and notifies observers and exit hooks.
    pub(crate) fn terminate(
        &self,
        cell: &Arc<ActorCell>,
        processor: Box<dyn Processor>,
        reason: ExitReason,
        cleanup: Cleanup,
    ) {
        let id = cell.id;
        cell.set_state(ActorState::Terminating);
        let remains = processor.finalize(&reason, cleanup, &cell.mailbox);

        cell.set_state(ActorState::Terminated);
        let removed = write(&self.arena).remove(&id);
        // Actor state is dropped outside every runtime lock.
        drop(remains);
        drop(removed);
        log_lifecycle!(&*cell.name, id.as_u64(), "terminated", reason = %reason);

        let obituary = lock(&self.registry).take(id);
        let note = DownNotification::new(id, reason);
        for observer in obituary.observers {
            if self
                .deliver(observer, Envelope::down(note.clone()), Origin::Runtime)
                .is_err()
            {
                trace!(observer = %observer, subject = %id, "observer already gone");
            }
        }
        run_hooks(obituary.hooks, &note);
    }

    // --- delivery ---

    pub(crate) fn deliver(&self, target: ActorId, envelope: Envelope, origin: Origin) -> Result<(), ActorError> {
        if origin == Origin::External && self.status() != SystemStatus::Running {
            return Err(refuse(envelope, || ActorError::SchedulerShuttingDown));
        }
        let Some(cell) = self.cell(target) else {
            return Err(refuse(envelope, || ActorError::ActorNotFound(target)));
        };
        match cell.mailbox.enqueue(envelope) {
            Ok(()) => {
                self.schedule(&cell);
                Ok(())
            }
            Err(envelope) => Err(refuse(envelope, || ActorError::ActorNotFound(target))),
        }
    }

    /// Routes the answer of a request back into the requesting actor.
    pub(crate) fn deliver_response(
        &self,
        requester: ActorId,
        responder: Option<ActorId>,
        correlation: CorrelationId,
        result: ActorResult<BoxedMessage>,
    ) {
        let envelope = Envelope::response(responder, correlation, result);
        let refused = match self.cell(requester) {
            Some(cell) => match cell.mailbox.enqueue(envelope) {
                Ok(()) => {
                    self.schedule(&cell);
                    return;
                }
                Err(envelope) => envelope,
            },
            None => envelope,
        };

        match refused.body {
            Body::Response(Err(error)) => self.record(Diagnostic::new(
                Some(requester),
                error,
                "response to a terminated requester",
            )),
            _ => debug!(requester = %requester, %correlation, "response to a terminated requester dropped"),
        }
    }

    pub(crate) fn stop_actor(
        &self,
        target: ActorId,
        sender: Option<ActorId>,
        reason: ExitReason,
    ) -> Result<(), ActorError> {
        self.deliver(target, Envelope::exit(sender, reason), Origin::Runtime)
    }

    // --- monitoring ---

    pub(crate) fn monitor(&self, observer: ActorId, subject: ActorId) {
        let mut registry = lock(&self.registry);
        let (observer_alive, subject_alive) = {
            let arena = read(&self.arena);
            (arena.contains_key(&observer), arena.contains_key(&subject))
        };
        if !observer_alive {
            return;
        }
        if subject_alive {
            if !registry.insert(observer, subject) {
                trace!(observer = %observer, subject = %subject, "already monitoring");
            }
            return;
        }
        drop(registry);

        debug!(observer = %observer, subject = %subject, "monitored actor is already gone");
        let note = DownNotification::new(subject, ExitReason::Unreachable);
        let _ = self.deliver(observer, Envelope::down(note), Origin::Runtime);
    }

    pub(crate) fn demonitor(&self, observer: ActorId, subject: ActorId) {
        lock(&self.registry).remove(observer, subject);
    }

    fn attach_exit_hook(&self, subject: ActorId, hook: ExitHook) {
        let mut registry = lock(&self.registry);
        if read(&self.arena).contains_key(&subject) {
            registry.attach_hook(subject, hook);
            return;
        }
        drop(registry);
        run_hooks(vec![hook], &DownNotification::new(subject, ExitReason::Unreachable));
    }

    // --- shutdown ---

    fn shutdown(self: &Arc<Self>, policy: DrainPolicy) -> Result<(), SystemError> {
        match policy {
            DrainPolicy::Graceful => self.shutdown_gracefully(),
            DrainPolicy::Immediate => {
                if self.status() == SystemStatus::Stopped {
                    return Err(SystemError::ShuttingDown);
                }
                self.stop_now();
                Ok(())
            }
        }
    }

    fn shutdown_gracefully(self: &Arc<Self>) -> Result<(), SystemError> {
        if !self.transition(SystemStatus::Running, SystemStatus::Draining) {
            return Err(SystemError::ShuttingDown);
        }
        let timeout = self.config.shutdown_timeout;
        log_scheduler!(self.config.name.as_str(), "draining", actors = self.live_actors());

        if !self.wait_for(timeout, SystemInner::is_quiescent) {
            warn!(
                system = %self.config.name,
                in_flight = self.in_flight.load(Ordering::SeqCst),
                "actors still busy after {:?}, stopping immediately",
                timeout
            );
            self.stop_now();
            return Err(SystemError::Timeout(format!(
                "{} did not become idle within {:?}",
                self.config.name, timeout
            )));
        }

        self.set_status(SystemStatus::Stopping);
        let mut ids: Vec<ActorId> = read(&self.arena).keys().copied().collect();
        ids.sort();
        log_scheduler!(self.config.name.as_str(), "stopping", actors = ids.len());
        for id in ids {
            let _ = self.stop_actor(id, None, ExitReason::SystemShutdown);
        }

        if !self.wait_for(timeout, |inner| inner.live_actors() == 0) {
            warn!(
                system = %self.config.name,
                remaining = self.live_actors(),
                "actors did not stop within {:?}, stopping immediately",
                timeout
            );
            self.stop_now();
            return Err(SystemError::Timeout(format!(
                "actors of {} did not stop within {:?}",
                self.config.name, timeout
            )));
        }

        self.halt_workers();
        self.timers.shutdown();
        self.set_status(SystemStatus::Stopped);
        info!(system = %self.config.name, "actor system stopped");
        Ok(())
    }

    fn wait_for(self: &Arc<Self>, timeout: Duration, done: impl Fn(&SystemInner) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_manual() {
                self.drive(deadline);
            }
            if done(self.as_ref()) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(self.config.idle_wait);
        }
    }

    /// Halts the workers, then terminates every actor in place. Queued
    /// requests and open promises are orphaned.
    fn stop_now(&self) {
        self.set_status(SystemStatus::Stopping);
        self.halt_workers();

        let mut cells: Vec<Arc<ActorCell>> = read(&self.arena).values().cloned().collect();
        cells.sort_by_key(|cell| cell.id);
        log_scheduler!(self.config.name.as_str(), "terminating", actors = cells.len());
        for cell in &cells {
            cell.seal();
            let processor = lock(&cell.processor).take();
            if let Some(processor) = processor {
                self.terminate(cell, processor, ExitReason::SystemShutdown, Cleanup::Orphan);
            }
        }
        // Cells that were still starting.
        let leftovers = std::mem::take(&mut *write(&self.arena));
        drop(leftovers);

        self.timers.shutdown();
        self.set_status(SystemStatus::Stopped);
        info!(system = %self.config.name, "actor system stopped immediately");
    }

    fn halt_workers(&self) {
        let pool = lock(&self.workers).take();
        if let Some(mut pool) = pool {
            pool.halt_and_join();
        }
    }
}

impl fmt::Debug for SystemInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemInner")
            .field("name", &self.config.name)
            .field("status", &self.status())
            .field("actors", &self.live_actors())
            .field("queue", &self.queue)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish()
    }
}

/// Answers the reply route of a refused envelope and returns the error
/// for the caller.
fn refuse(envelope: Envelope, error: impl Fn() -> ActorError) -> ActorError {
    if let Some(reply) = envelope.reply_to {
        reply.respond(None, Err(error()));
    }
    error()
}

fn run_hooks(hooks: Vec<ExitHook>, note: &DownNotification) {
    for hook in hooks {
        if panic::catch_unwind(AssertUnwindSafe(|| hook(note))).is_err() {
            warn!(subject = %note.subject, "exit hook panicked");
        }
    }
}

/// Entry point of the runtime.
///
/// Dropping a system that was not shut down stops it immediately.
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

impl ActorSystem {
    /// Starts a system. With `SchedulingMode::SharedPool` the worker
    /// threads are running when this returns.
    ///
    /// # Errors
    /// `ConfigError` for an invalid configuration, `ThreadSetupError` when
    /// a worker or timer thread cannot be started.
    pub fn new(config: SystemConfig) -> Result<Self, SystemError> {
        config.validate()?;
        let timers = TimerDriver::new(&config.thread_name_prefix)?;
        let inner = Arc::new(SystemInner::new(config, timers));

        if let SchedulingMode::SharedPool { pool_size } = inner.config.scheduling_mode {
            let pool = WorkerPool::start(
                Arc::downgrade(&inner),
                inner.queue.clone(),
                pool_size,
                &inner.config.thread_name_prefix,
                inner.config.idle_wait,
            )?;
            log_scheduler!(inner.config.name.as_str(), "started", workers = pool.size());
            *lock(&inner.workers) = Some(pool);
        }

        info!(
            system = %inner.config.name,
            mode = ?inner.config.scheduling_mode,
            "actor system started"
        );
        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    pub fn status(&self) -> SystemStatus {
        self.inner.status()
    }

    /// Spawns `actor`. Its `make_behavior` runs on the calling thread.
    pub fn spawn<A: Actor>(&self, actor: A) -> Result<Handle<A::Interface>, SpawnError> {
        self.spawn_with(move || actor)
    }

    /// Spawns the actor built by `constructor`. A panicking constructor
    /// yields `SpawnError::ConstructorPanicked`.
    pub fn spawn_with<A, F>(&self, constructor: F) -> Result<Handle<A::Interface>, SpawnError>
    where
        A: Actor,
        F: FnOnce() -> A,
    {
        self.inner.spawn_actor(constructor, Origin::External)
    }

    /// One-way send.
    ///
    /// # Errors
    /// `ActorNotFound` if the target has terminated, `SchedulerShuttingDown`
    /// once shutdown has started.
    pub fn send<I, M>(&self, to: Handle<I>, msg: M) -> Result<(), ActorError>
    where
        I: Accepts<M>,
        M: Message,
    {
        self.send_untyped(to.id(), msg)
    }

    /// Sends a request and returns the future of its answer. `timeout`
    /// falls back to `SystemConfig::default_request_timeout`.
    pub fn request<I, M>(&self, to: Handle<I>, msg: M, timeout: Option<Duration>) -> ResponseFuture<M::Result>
    where
        I: Accepts<M>,
        M: Message,
    {
        self.request_untyped(to.id(), msg, timeout)
    }

    /// `send` without the interface check. A message the target has no
    /// behavior for fails inside the target with `UnexpectedMessageKind`.
    pub fn send_untyped<M: Message>(&self, to: ActorId, msg: M) -> Result<(), ActorError> {
        self.inner
            .deliver(to, Envelope::message(None, msg, None), Origin::External)
    }

    /// `request` without the interface check.
    pub fn request_untyped<M: Message>(
        &self,
        to: ActorId,
        msg: M,
        timeout: Option<Duration>,
    ) -> ResponseFuture<M::Result> {
        let (promise, future) = promise::channel::<M::Result>();
        if let Some(deadline) = timeout.or(self.inner.config.default_request_timeout) {
            let pending = promise.downgrade();
            self.inner.timers.schedule(deadline, move || {
                if let Some(promise) = pending.upgrade() {
                    let _ = promise.fail(ActorError::TimedOut(deadline));
                }
            });
        }

        let envelope = Envelope::message(None, msg, Some(ReplyTo::external(promise)));
        if let Err(error) = self.inner.deliver(to, envelope, Origin::External) {
            debug!(target = %to, error = %error, "request refused");
        }
        future
    }

    /// Makes `observer` receive a `Down` notification when `subject`
    /// terminates. An already terminated subject is reported at once.
    pub fn monitor(&self, observer: &impl Addressable, subject: &impl Addressable) {
        self.inner.monitor(observer.actor_id(), subject.actor_id());
    }

    pub fn demonitor(&self, observer: &impl Addressable, subject: &impl Addressable) {
        self.inner.demonitor(observer.actor_id(), subject.actor_id());
    }

    /// Asks `target` to stop. Queued user messages still ahead of the stop
    /// command are answered with `ActorNotFound`.
    pub fn stop(&self, target: &impl Addressable, reason: ExitReason) -> Result<(), ActorError> {
        self.inner.stop_actor(target.actor_id(), None, reason)
    }

    /// Runs `hook` once `target` has terminated, on the terminating thread.
    /// Runs right away with `ExitReason::Unreachable` if the target is
    /// already gone.
    pub fn attach_exit_hook<F>(&self, target: &impl Addressable, hook: F)
    where
        F: FnOnce(&DownNotification) + Send + 'static,
    {
        self.inner.attach_exit_hook(target.actor_id(), Box::new(hook));
    }

    /// Resolves with the exit reason of `target`.
    pub fn exit_future(&self, target: &impl Addressable) -> ResponseFuture<ExitReason> {
        let (promise, future) = promise::channel::<ExitReason>();
        self.attach_exit_hook(target, move |note| {
            let _ = promise.deliver(note.reason.clone());
        });
        future
    }

    /// Stops the system.
    ///
    /// # Errors
    /// `ShuttingDown` if a shutdown already ran, `Timeout` if a graceful
    /// shutdown had to fall back to an immediate one.
    pub fn shutdown(&self, policy: DrainPolicy) -> Result<(), SystemError> {
        self.inner.shutdown(policy)
    }

    /// Lifecycle state of `target`; unknown actors read as `Terminated`.
    pub fn state_of(&self, target: &impl Addressable) -> ActorState {
        self.inner
            .cell(target.actor_id())
            .map_or(ActorState::Terminated, |cell| cell.state())
    }

    pub fn live_actors(&self) -> usize {
        self.inner.live_actors()
    }

    /// Errors nobody was waiting for.
    pub fn diagnostics(&self) -> flume::Receiver<Diagnostic> {
        self.inner.diagnostics.receiver()
    }

    /// Diagnostics lost because the channel was full.
    pub fn dropped_diagnostics(&self) -> u64 {
        self.inner.diagnostics.dropped()
    }

    /// Runs ready actors on the calling thread until none is left and
    /// returns the number of steps taken. Meant for
    /// `SchedulingMode::Manual`; with a worker pool it competes with the
    /// workers.
    pub fn run_until_idle(&self) -> usize {
        self.inner.run_until_idle()
    }
}

impl Drop for ActorSystem {
    fn drop(&mut self) {
        if self.inner.status() != SystemStatus::Stopped {
            debug!(system = %self.inner.config.name, "dropped while running");
            self.inner.stop_now();
        }
    }
}

impl fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSystem")
            .field("name", &self.inner.config.name)
            .field("status", &self.inner.status())
            .field("actors", &self.inner.live_actors())
            .finish()
    }
}
