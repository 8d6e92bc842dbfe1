//! # Behavior Tables
//!
//! A [`Behavior`] is an ordered list of `(Shape, handler)` entries; the
//! first entry whose shape matches the incoming message wins. Handlers
//! return a [`Reply`], which the dispatcher turns into the response for the
//! requester.
//!
//! An actor replaces its behavior with `Context::switch_behavior`; the new
//! table takes effect after the running handler returns.

use std::fmt;

use tracing::debug;
use wren_api::errors::ActorError;
use wren_api::types::BoxedMessage;
use wren_api::{Message, Shape};

use crate::actor::Actor;
use crate::context::Context;
use crate::promise::ResponsePromise;

/// What a handler produces.
pub enum Reply<R: Send + 'static> {
    /// Answer right away.
    Value(R),
    /// Answer later through a promise made with
    /// `Context::make_response_promise`.
    Deferred(ResponsePromise<R>),
    /// Answer with an error; the actor keeps running.
    Failed(ActorError),
}

impl Reply<()> {
    /// `Reply::Value(())`.
    pub fn done() -> Self {
        Reply::Value(())
    }
}

impl<R: Send + 'static> From<ResponsePromise<R>> for Reply<R> {
    fn from(promise: ResponsePromise<R>) -> Self {
        Reply::Deferred(promise)
    }
}

impl<R: Send + 'static> From<Result<R, ActorError>> for Reply<R> {
    fn from(result: Result<R, ActorError>) -> Self {
        match result {
            Ok(value) => Reply::Value(value),
            Err(err) => Reply::Failed(err),
        }
    }
}

impl<R: Send + 'static> fmt::Debug for Reply<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value(_) => f.write_str("Reply::Value(..)"),
            Reply::Deferred(promise) => write!(f, "Reply::Deferred({:?})", promise),
            Reply::Failed(err) => write!(f, "Reply::Failed({})", err),
        }
    }
}

type Handler<A> = Box<dyn FnMut(&mut A, &mut Context<A>, BoxedMessage) + Send>;

struct Entry<A: Actor> {
    shape: Shape,
    handler: Handler<A>,
}

/// Ordered message dispatch table of an actor.
pub struct Behavior<A: Actor> {
    entries: Vec<Entry<A>>,
}

impl<A: Actor> Behavior<A> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds a handler for messages of type `M`.
    ///
    /// The handler's [`Reply`] answers the requester. For one-way sends a
    /// value is dropped and a failure is recorded in the diagnostics
    /// channel.
    pub fn on<M, F>(mut self, mut handler: F) -> Self
    where
        M: Message,
        F: FnMut(&mut A, &mut Context<A>, M) -> Reply<M::Result> + Send + 'static,
    {
        let shape = Shape::of::<M>();
        let erased: Handler<A> = Box::new(move |actor, ctx, payload| {
            let msg = match payload.downcast::<M>() {
                Ok(msg) => *msg,
                Err(_) => {
                    ctx.reply_with(Err(ActorError::UnexpectedMessageKind {
                        actor: ctx.id(),
                        message: shape.name(),
                    }));
                    return;
                }
            };
            match handler(actor, ctx, msg) {
                Reply::Value(value) => ctx.reply_with(Ok(Box::new(value))),
                Reply::Failed(err) => ctx.reply_with(Err(err)),
                Reply::Deferred(_) => {
                    if ctx.has_open_reply() {
                        debug!(message = shape.name(), "deferred reply without a response promise");
                    }
                }
            }
        });
        self.entries.push(Entry {
            shape,
            handler: erased,
        });
        self
    }

    /// Whether some entry handles `shape`.
    pub fn handles(&self, shape: &Shape) -> bool {
        self.entries.iter().any(|entry| entry.shape == *shape)
    }

    pub fn shapes(&self) -> impl Iterator<Item = Shape> + '_ {
        self.entries.iter().map(|entry| entry.shape)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the `required` shapes this behavior does not handle.
    pub fn missing(&self, required: &[Shape]) -> Vec<&'static str> {
        required
            .iter()
            .filter(|shape| !self.handles(shape))
            .map(|shape| shape.name())
            .collect()
    }

    /// Runs the first matching handler. Hands the payload back when no
    /// entry matches.
    pub(crate) fn dispatch(
        &mut self,
        shape: &Shape,
        actor: &mut A,
        ctx: &mut Context<A>,
        payload: BoxedMessage,
    ) -> Result<(), BoxedMessage> {
        match self.entries.iter_mut().find(|entry| entry.shape == *shape) {
            Some(entry) => {
                (entry.handler)(actor, ctx, payload);
                Ok(())
            }
            None => Err(payload),
        }
    }
}

impl<A: Actor> Default for Behavior<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Actor> fmt::Debug for Behavior<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.shape))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Weak};

    use wren_api::{interface, ActorId, Interface};

    use super::*;

    #[derive(wren_api::Message)]
    #[message(result = "u32")]
    struct Add(u32);

    #[derive(wren_api::Message)]
    struct Reset;

    interface! {
        CounterApi { Add, Reset }
    }

    #[derive(Default)]
    struct Counter {
        total: u32,
        hits: Vec<&'static str>,
    }

    impl Actor for Counter {
        type Interface = CounterApi;

        fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
            Behavior::new()
        }
    }

    fn context() -> Context<Counter> {
        Context::new(ActorId::next(), Arc::from("counter"), Weak::new())
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let mut behavior = Behavior::new()
            .on(|counter: &mut Counter, _, Add(n): Add| {
                counter.total += n;
                counter.hits.push("first");
                Reply::Value(counter.total)
            })
            .on(|counter: &mut Counter, _, _: Add| {
                counter.hits.push("second");
                Reply::Value(0)
            });
        let mut counter = Counter::default();
        let mut ctx = context();

        let shape = Shape::of::<Add>();
        assert!(behavior
            .dispatch(&shape, &mut counter, &mut ctx, Box::new(Add(3)))
            .is_ok());
        assert_eq!(counter.total, 3);
        assert_eq!(counter.hits, vec!["first"]);
    }

    #[test]
    fn test_unknown_shape_hands_the_payload_back() {
        let mut behavior = Behavior::new().on(|_: &mut Counter, _, _: Reset| Reply::done());
        let mut counter = Counter::default();
        let mut ctx = context();

        let payload = behavior
            .dispatch(&Shape::of::<Add>(), &mut counter, &mut ctx, Box::new(Add(1)))
            .unwrap_err();
        assert_eq!(payload.downcast::<Add>().map(|add| add.0).ok(), Some(1));
    }

    #[test]
    fn test_missing_lists_uncovered_shapes() {
        let behavior: Behavior<Counter> = Behavior::new().on(|_, _, _: Reset| Reply::done());
        assert_eq!(behavior.missing(&CounterApi::shapes()), vec!["Add"]);
        assert!(behavior.handles(&Shape::of::<Reset>()));
        assert_eq!(behavior.len(), 1);
        assert!(Behavior::<Counter>::new().is_empty());
    }

    #[test]
    fn test_reply_from_result() {
        assert!(matches!(Reply::from(Ok::<u32, ActorError>(2)), Reply::Value(2)));
        let failed: Reply<u32> = Err(ActorError::handling("nope")).into();
        assert!(matches!(failed, Reply::Failed(ActorError::MessageHandlingError(_))));
    }
}
