//! # Promise/Future Bridge
//!
//! A [`Promise`] is the write side of an exactly-once result slot; the
//! matching [`ResponseFuture`] is the read side. External callers get a
//! `ResponseFuture` from `ActorSystem::request` and can block on it, poll it
//! as a `std::future::Future`, or register a callback.
//!
//! Inside actors the write side is a [`ResponsePromise`], made with
//! `Context::make_response_promise`. It routes the answer through the
//! requester's mailbox when the requester is an actor, so continuations
//! always re-enter through the scheduler.
//!
//! ## Usage Example
//!
//! ```rust
//! use wren::promise;
//!
//! let (promise, future) = promise::channel::<u32>();
//! std::thread::spawn(move || {
//!     promise.deliver(42).unwrap();
//! });
//! assert_eq!(future.wait().unwrap(), 42);
//! ```

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::task::{Context as TaskContext, Poll, Waker};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wren_api::errors::ActorError;
use wren_api::types::ActorResult;
use wren_api::ActorId;

use crate::reply::ReplyTo;
use crate::sync::lock;

type Callback<T> = Box<dyn FnOnce(ActorResult<T>) + Send>;

enum SlotState<T> {
    Pending {
        callback: Option<Callback<T>>,
        waker: Option<Waker>,
    },
    Ready(ActorResult<T>),
    /// The result was handed to its consumer.
    Consumed,
}

struct Slot<T> {
    state: Mutex<SlotState<T>>,
    resolved: Condvar,
}

impl<T: Send + 'static> Slot<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending {
                callback: None,
                waker: None,
            }),
            resolved: Condvar::new(),
        }
    }

    fn ready(result: ActorResult<T>) -> Self {
        Self {
            state: Mutex::new(SlotState::Ready(result)),
            resolved: Condvar::new(),
        }
    }

    fn complete(&self, result: ActorResult<T>) -> Result<(), ActorError> {
        let mut state = lock(&self.state);
        let (callback, waker) = match &mut *state {
            SlotState::Pending { callback, waker } => (callback.take(), waker.take()),
            _ => return Err(ActorError::DoubleFulfillment),
        };

        match callback {
            Some(callback) => {
                *state = SlotState::Consumed;
                drop(state);
                callback(result);
            }
            None => {
                *state = SlotState::Ready(result);
                drop(state);
                self.resolved.notify_all();
                if let Some(waker) = waker {
                    waker.wake();
                }
            }
        }
        Ok(())
    }

    fn is_pending(&self) -> bool {
        matches!(*lock(&self.state), SlotState::Pending { .. })
    }
}

/// Creates a connected promise/future pair.
pub fn channel<T: Send + 'static>() -> (Promise<T>, ResponseFuture<T>) {
    let slot = Arc::new(Slot::new());
    let promise = Promise {
        shared: Arc::new(PromiseShared {
            slot: slot.clone(),
            owner: None,
        }),
    };
    (promise, ResponseFuture { slot })
}

struct PromiseShared<T: Send + 'static> {
    slot: Arc<Slot<T>>,
    owner: Option<ActorId>,
}

impl<T: Send + 'static> Drop for PromiseShared<T> {
    fn drop(&mut self) {
        if self.slot.is_pending() {
            let _ = self.slot.complete(Err(ActorError::PromiseOrphaned { owner: self.owner }));
        }
    }
}

/// Write side of a result slot.
///
/// Clones share the slot. When the last clone is dropped without a
/// fulfilment, the future resolves with `PromiseOrphaned`.
pub struct Promise<T: Send + 'static> {
    shared: Arc<PromiseShared<T>>,
}

impl<T: Send + 'static> Promise<T> {
    /// Fulfils the promise with a value.
    ///
    /// # Errors
    /// `DoubleFulfillment` if the promise was already fulfilled or failed.
    pub fn deliver(&self, value: T) -> Result<(), ActorError> {
        self.shared.slot.complete(Ok(value))
    }

    /// Fulfils the promise with an error.
    pub fn fail(&self, error: ActorError) -> Result<(), ActorError> {
        self.shared.slot.complete(Err(error))
    }

    pub fn is_fulfilled(&self) -> bool {
        !self.shared.slot.is_pending()
    }

    pub(crate) fn downgrade(&self) -> WeakPromise<T> {
        WeakPromise {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl<T: Send + 'static> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("fulfilled", &self.is_fulfilled())
            .finish()
    }
}

/// Non-owning promise reference used by deadline timers, so a pending
/// timer does not keep a promise from being orphaned.
pub(crate) struct WeakPromise<T: Send + 'static> {
    shared: Weak<PromiseShared<T>>,
}

impl<T: Send + 'static> WeakPromise<T> {
    pub(crate) fn upgrade(&self) -> Option<Promise<T>> {
        self.shared.upgrade().map(|shared| Promise { shared })
    }
}

/// Read side of a result slot.
///
/// Resolves exactly once, with a value or an [`ActorError`]. Consume it
/// with one of [`on_ready`](Self::on_ready), [`wait`](Self::wait),
/// [`wait_timeout`](Self::wait_timeout), or `.await`.
pub struct ResponseFuture<T: Send + 'static> {
    slot: Arc<Slot<T>>,
}

impl<T: Send + 'static> ResponseFuture<T> {
    /// A future that is already resolved.
    pub fn ready(result: ActorResult<T>) -> Self {
        Self {
            slot: Arc::new(Slot::ready(result)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*lock(&self.slot.state), SlotState::Ready(_))
    }

    /// Runs `callback` once with the result: right away if the future is
    /// already resolved, otherwise on the thread that resolves it.
    pub fn on_ready<F>(self, callback: F)
    where
        F: FnOnce(ActorResult<T>) + Send + 'static,
    {
        let mut state = lock(&self.slot.state);
        match std::mem::replace(&mut *state, SlotState::Consumed) {
            SlotState::Ready(result) => {
                drop(state);
                callback(result);
            }
            SlotState::Pending { waker, .. } => {
                *state = SlotState::Pending {
                    callback: Some(Box::new(callback)),
                    waker,
                };
            }
            SlotState::Consumed => {
                drop(state);
                callback(Err(consumed_error()));
            }
        }
    }

    /// Blocks the calling thread until the future resolves.
    ///
    /// Never call this from inside an actor handler: the handler would hold
    /// its worker while waiting.
    pub fn wait(self) -> ActorResult<T> {
        let mut state = lock(&self.slot.state);
        loop {
            match std::mem::replace(&mut *state, SlotState::Consumed) {
                SlotState::Ready(result) => return result,
                SlotState::Consumed => return Err(consumed_error()),
                pending => {
                    *state = pending;
                    state = self
                        .slot
                        .resolved
                        .wait(state)
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                }
            }
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout` with
    /// `TimedOut`.
    pub fn wait_timeout(self, timeout: Duration) -> ActorResult<T> {
        let deadline = Instant::now() + timeout;
        let mut state = lock(&self.slot.state);
        loop {
            match std::mem::replace(&mut *state, SlotState::Consumed) {
                SlotState::Ready(result) => return result,
                SlotState::Consumed => return Err(consumed_error()),
                pending => {
                    *state = pending;
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ActorError::TimedOut(timeout));
                    }
                    state = self
                        .slot
                        .resolved
                        .wait_timeout(state, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|poisoned| poisoned.into_inner().0);
                }
            }
        }
    }
}

fn consumed_error() -> ActorError {
    ActorError::Other(anyhow::anyhow!("response future polled after completion"))
}

impl<T: Send + 'static> Future for ResponseFuture<T> {
    type Output = ActorResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let mut state = lock(&self.slot.state);
        match std::mem::replace(&mut *state, SlotState::Consumed) {
            SlotState::Ready(result) => Poll::Ready(result),
            SlotState::Consumed => Poll::Ready(Err(consumed_error())),
            SlotState::Pending { callback, .. } => {
                *state = SlotState::Pending {
                    callback,
                    waker: Some(cx.waker().clone()),
                };
                Poll::Pending
            }
        }
    }
}

impl<T: Send + 'static> fmt::Debug for ResponseFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseFuture")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[derive(Debug)]
enum RouteState {
    Open(Option<ReplyTo>),
    Fulfilled,
    Orphaned,
}

pub(crate) struct ResponseSlot {
    owner: ActorId,
    state: Mutex<RouteState>,
}

impl ResponseSlot {
    fn settle(&self, result: ActorResult<wren_api::BoxedMessage>) -> Result<(), ActorError> {
        let mut state = lock(&self.state);
        match std::mem::replace(&mut *state, RouteState::Fulfilled) {
            RouteState::Open(route) => {
                drop(state);
                if let Some(route) = route {
                    route.respond(Some(self.owner), result);
                }
                Ok(())
            }
            RouteState::Fulfilled => Err(ActorError::DoubleFulfillment),
            RouteState::Orphaned => {
                *state = RouteState::Orphaned;
                let err = ActorError::PromiseOrphaned {
                    owner: Some(self.owner),
                };
                warn!(owner = %self.owner, "delivery to orphaned response promise ignored");
                Err(err)
            }
        }
    }

    /// Fails the requester with `PromiseOrphaned` if still open.
    pub(crate) fn orphan(&self) {
        let mut state = lock(&self.state);
        if let RouteState::Open(route) = std::mem::replace(&mut *state, RouteState::Orphaned) {
            drop(state);
            if let Some(route) = route {
                debug!(owner = %self.owner, "orphaning response promise");
                route.respond(
                    Some(self.owner),
                    Err(ActorError::PromiseOrphaned {
                        owner: Some(self.owner),
                    }),
                );
            }
        }
    }
}

impl Drop for ResponseSlot {
    fn drop(&mut self) {
        self.orphan();
    }
}

/// Actor-side promise answering the request that is being handled.
///
/// Return it from the handler as `Reply::Deferred` and fulfil it later,
/// typically from a continuation. Clones share the same answer.
pub struct ResponsePromise<R: Send + 'static> {
    slot: Arc<ResponseSlot>,
    _response: PhantomData<fn(R)>,
}

impl<R: Send + 'static> ResponsePromise<R> {
    pub(crate) fn new(owner: ActorId, route: Option<ReplyTo>) -> Self {
        Self {
            slot: Arc::new(ResponseSlot {
                owner,
                state: Mutex::new(RouteState::Open(route)),
            }),
            _response: PhantomData,
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<ResponseSlot> {
        Arc::downgrade(&self.slot)
    }

    /// Answers the request.
    ///
    /// # Errors
    /// `DoubleFulfillment` on a second call; `PromiseOrphaned` once the
    /// owning actor has terminated.
    pub fn deliver(&self, value: R) -> Result<(), ActorError> {
        self.slot.settle(Ok(Box::new(value)))
    }

    /// Answers the request with an error.
    pub fn fail(&self, error: ActorError) -> Result<(), ActorError> {
        self.slot.settle(Err(error))
    }

    /// Passes a sub-request's outcome straight through.
    pub fn settle(&self, result: ActorResult<R>) -> Result<(), ActorError> {
        match result {
            Ok(value) => self.deliver(value),
            Err(err) => self.fail(err),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*lock(&self.slot.state), RouteState::Open(_))
    }
}

impl<R: Send + 'static> Clone for ResponsePromise<R> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _response: PhantomData,
        }
    }
}

impl<R: Send + 'static> fmt::Debug for ResponsePromise<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponsePromise")
            .field("owner", &self.slot.owner)
            .field("state", &*lock(&self.slot.state))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use wren_api::ErrorKind;

    #[test]
    fn test_deliver_then_wait() {
        let (promise, future) = channel::<u32>();
        assert!(!future.is_ready());
        promise.deliver(7).unwrap();
        assert!(future.is_ready());
        assert_eq!(future.wait().unwrap(), 7);
    }

    #[test]
    fn test_second_fulfilment_is_rejected() {
        let (promise, future) = channel::<u32>();
        promise.deliver(1).unwrap();

        let err = promise.deliver(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DoubleFulfillment);
        let err = promise.fail(ActorError::handling("late")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DoubleFulfillment);

        assert_eq!(future.wait().unwrap(), 1);
    }

    #[test]
    fn test_dropping_every_clone_orphans_the_future() {
        let (promise, future) = channel::<String>();
        let clone = promise.clone();
        drop(promise);
        assert!(!future.is_ready());
        drop(clone);

        let err = future.wait().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PromiseOrphaned);
    }

    #[test]
    fn test_on_ready_runs_once_on_resolving_thread() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (promise, future) = channel::<u32>();

        let seen = calls.clone();
        future.on_ready(move |result| {
            assert_eq!(result.unwrap(), 5);
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        thread::spawn(move || promise.deliver(5).unwrap())
            .join()
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_ready_runs_immediately_when_resolved() {
        let future = ResponseFuture::ready(Ok(3u8));
        let (tx, rx) = flume::unbounded();
        future.on_ready(move |result| tx.send(result.unwrap()).unwrap());
        assert_eq!(rx.try_recv().unwrap(), 3);
    }

    #[test]
    fn test_wait_timeout_expires() {
        let (_promise, future) = channel::<u32>();
        let err = future.wait_timeout(Duration::from_millis(20)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn test_wait_across_threads() {
        let (promise, future) = channel::<u32>();
        let handle = thread::spawn(move || future.wait_timeout(Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(10));
        promise.deliver(11).unwrap();
        assert_eq!(handle.join().unwrap().unwrap(), 11);
    }

    #[test]
    fn test_weak_promise_does_not_keep_slot_open() {
        let (promise, future) = channel::<u32>();
        let weak = promise.downgrade();
        assert!(weak.upgrade().is_some());
        drop(promise);
        assert!(weak.upgrade().is_none());
        assert_eq!(future.wait().unwrap_err().kind(), ErrorKind::PromiseOrphaned);
    }

    #[tokio::test]
    async fn test_future_can_be_awaited() {
        let (promise, future) = channel::<&'static str>();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            promise.deliver("done").unwrap();
        });
        assert_eq!(future.await.unwrap(), "done");
    }

    #[test]
    fn test_response_promise_without_route() {
        let promise = ResponsePromise::<u32>::new(ActorId::next(), None);
        assert!(promise.is_pending());
        promise.deliver(1).unwrap();
        assert!(!promise.is_pending());
        assert_eq!(promise.deliver(2).unwrap_err().kind(), ErrorKind::DoubleFulfillment);
    }

    #[test]
    fn test_response_promise_after_orphaning() {
        let (inner, future) = channel::<u32>();
        let owner = ActorId::next();
        let promise = ResponsePromise::<u32>::new(owner, Some(ReplyTo::external(inner)));

        promise.downgrade().upgrade().unwrap().orphan();

        let err = future.wait().unwrap_err();
        assert!(matches!(err, ActorError::PromiseOrphaned { owner: Some(id) } if id == owner));
        assert_eq!(promise.deliver(3).unwrap_err().kind(), ErrorKind::PromiseOrphaned);
    }

    #[test]
    fn test_response_promise_routes_value() {
        let (inner, future) = channel::<String>();
        let promise = ResponsePromise::<String>::new(ActorId::next(), Some(ReplyTo::external(inner)));
        let clone = promise.clone();

        clone.deliver("reversed".to_string()).unwrap();
        assert_eq!(future.wait().unwrap(), "reversed");
        assert_eq!(
            promise.deliver("again".to_string()).unwrap_err().kind(),
            ErrorKind::DoubleFulfillment
        );
    }
}
