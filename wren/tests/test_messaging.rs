use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use wren::prelude::*;

use test_helpers::{manual_system, pooled_system, WAIT};

#[derive(Message)]
#[message(result = "u64")]
struct Add(u64);

#[derive(Message)]
struct Record {
    sender: u32,
    seq: u32,
}

#[derive(Message)]
#[message(result = "Vec<(u32, u32)>")]
struct History;

#[derive(Message)]
#[message(result = "u64")]
struct Checked(i64);

/// Not part of any interface.
#[derive(Message)]
#[message(result = "u64")]
struct Stranger;

interface! {
    pub CounterApi { Add, Record, History, Checked }
}

/// Counts and records, and notices if two handlers ever overlap.
struct Counter {
    total: u64,
    history: Vec<(u32, u32)>,
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
}

impl Counter {
    fn new() -> Self {
        Self {
            total: 0,
            history: Vec::new(),
            busy: Arc::new(AtomicBool::new(false)),
            overlaps: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn enter(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn leave(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl Actor for Counter {
    type Interface = CounterApi;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new()
            .on(|counter: &mut Counter, _ctx, Add(n): Add| {
                counter.enter();
                counter.total += n;
                counter.leave();
                Reply::Value(counter.total)
            })
            .on(|counter: &mut Counter, _ctx, Record { sender, seq }: Record| {
                counter.enter();
                counter.history.push((sender, seq));
                thread::yield_now();
                counter.leave();
                Reply::done()
            })
            .on(|counter: &mut Counter, _ctx, _: History| Reply::Value(counter.history.clone()))
            .on(|counter: &mut Counter, _ctx, Checked(n): Checked| {
                if n < 0 {
                    return Reply::Failed(ActorError::handling(format!("negative input {}", n)));
                }
                counter.total += n as u64;
                Reply::Value(counter.total)
            })
    }
}

#[test]
fn test_request_response() {
    let system = pooled_system(2);
    let counter = system.spawn(Counter::new()).unwrap();

    assert_eq!(system.request(counter, Add(2), None).wait_timeout(WAIT).unwrap(), 2);
    assert_eq!(system.request(counter, Add(3), None).wait_timeout(WAIT).unwrap(), 5);
    assert_eq!(system.state_of(&counter), ActorState::Running);

    system.shutdown(DrainPolicy::Graceful).unwrap();
}

#[test]
fn test_racing_senders_keep_per_sender_order_and_exclusivity() {
    const SENDERS: u32 = 4;
    const PER_SENDER: u32 = 250;

    let system = Arc::new(pooled_system(4));
    let actor = Counter::new();
    let overlaps = actor.overlaps.clone();
    let counter = system.spawn(actor).unwrap();

    let threads: Vec<_> = (0..SENDERS)
        .map(|sender| {
            let system = system.clone();
            thread::spawn(move || {
                for seq in 0..PER_SENDER {
                    system.send(counter, Record { sender, seq }).unwrap();
                    system.send(counter, Add(1)).unwrap();
                }
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }

    let history = system.request(counter, History, None).wait_timeout(WAIT).unwrap();
    assert_eq!(history.len(), (SENDERS * PER_SENDER) as usize);
    for sender in 0..SENDERS {
        let seqs: Vec<u32> = history
            .iter()
            .filter(|(from, _)| *from == sender)
            .map(|(_, seq)| *seq)
            .collect();
        assert_eq!(seqs, (0..PER_SENDER).collect::<Vec<_>>());
    }

    let total = system.request(counter, Add(0), None).wait_timeout(WAIT).unwrap();
    assert_eq!(total, u64::from(SENDERS * PER_SENDER));
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);

    system.shutdown(DrainPolicy::Graceful).unwrap();
}

#[test]
fn test_request_to_terminated_actor_fails_with_actor_not_found() {
    let system = pooled_system(2);
    let counter = system.spawn(Counter::new()).unwrap();
    let exited = system.exit_future(&counter);

    system.stop(&counter, ExitReason::UserShutdown).unwrap();
    assert_eq!(exited.wait_timeout(WAIT).unwrap(), ExitReason::UserShutdown);
    assert_eq!(system.state_of(&counter), ActorState::Terminated);

    let err = system.request(counter, Add(1), None).wait_timeout(WAIT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ActorNotFound);
    let err = system.send(counter, Add(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ActorNotFound);
    let err = system.stop(&counter, ExitReason::Normal).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ActorNotFound);

    system.shutdown(DrainPolicy::Graceful).unwrap();
}

#[test]
fn test_unknown_message_kind_is_reported_and_actor_survives() {
    let system = manual_system();
    let counter = system.spawn(Counter::new()).unwrap();

    let answer = system.request_untyped(counter.id(), Stranger, None);
    system.send_untyped(counter.id(), Stranger).unwrap();
    system.run_until_idle();

    let err = answer.wait_timeout(WAIT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedMessageKind);
    assert!(err.to_string().contains("Stranger"));

    // The one-way copy had nobody to tell, so it went to diagnostics.
    let diagnostic = system.diagnostics().try_recv().unwrap();
    assert_eq!(diagnostic.actor, Some(counter.id()));
    assert_eq!(diagnostic.error.kind(), ErrorKind::UnexpectedMessageKind);

    let total = system.request(counter, Add(1), None);
    system.run_until_idle();
    assert_eq!(total.wait_timeout(WAIT).unwrap(), 1);
    assert_eq!(system.state_of(&counter), ActorState::Running);
}

#[test]
fn test_failed_reply_keeps_actor_running() {
    let system = manual_system();
    let counter = system.spawn(Counter::new()).unwrap();

    let failed = system.request(counter, Checked(-4), None);
    let ok = system.request(counter, Checked(4), None);
    system.run_until_idle();

    let err = failed.wait_timeout(WAIT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MessageHandlingError);
    assert_eq!(err.to_string(), "Message handling failed: negative input -4");
    assert_eq!(ok.wait_timeout(WAIT).unwrap(), 4);
}

#[derive(Message)]
#[message(result = "u64")]
struct Hold;

interface! {
    pub HolderApi { Hold }
}

/// Takes requests and never answers them.
#[derive(Default)]
struct Holder {
    held: Vec<ResponsePromise<u64>>,
}

impl Actor for Holder {
    type Interface = HolderApi;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new().on(|holder: &mut Holder, ctx, _: Hold| {
            let promise = ctx.make_response_promise();
            holder.held.push(promise.clone());
            Reply::Deferred(promise)
        })
    }
}

#[test]
fn test_external_request_times_out() {
    let system = pooled_system(2);
    let holder = system.spawn(Holder::default()).unwrap();

    let err = system
        .request(holder, Hold, Some(Duration::from_millis(30)))
        .wait_timeout(WAIT)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TimedOut);

    system.shutdown(DrainPolicy::Graceful).unwrap();
}

#[test]
fn test_default_request_timeout_applies() {
    test_helpers::logging_for_tests();
    let system = ActorSystem::new(
        SystemConfig::default()
            .with_pool_size(1)
            .with_default_request_timeout(Some(Duration::from_millis(30))),
    )
    .unwrap();
    let holder = system.spawn(Holder::default()).unwrap();

    let err = system.request(holder, Hold, None).wait_timeout(WAIT).unwrap_err();
    assert!(matches!(err, ActorError::TimedOut(after) if after == Duration::from_millis(30)));

    system.shutdown(DrainPolicy::Graceful).unwrap();
}

#[test]
fn test_deadlines_outlive_the_runtime_the_system_was_built_in() {
    test_helpers::logging_for_tests();
    let caller = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let system = caller
        .block_on(async { ActorSystem::new(SystemConfig::default().with_pool_size(1)) })
        .unwrap();
    drop(caller);
    let holder = system.spawn(Holder::default()).unwrap();

    let err = system
        .request(holder, Hold, Some(Duration::from_millis(30)))
        .wait_timeout(WAIT)
        .unwrap_err();
    assert!(matches!(err, ActorError::TimedOut(after) if after == Duration::from_millis(30)));

    system.shutdown(DrainPolicy::Graceful).unwrap();
}

#[test]
fn test_deadlines_fire_while_the_calling_runtime_is_blocked() {
    test_helpers::logging_for_tests();
    let caller = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    caller.block_on(async {
        let system = ActorSystem::new(SystemConfig::default().with_pool_size(1)).unwrap();
        let holder = system.spawn(Holder::default()).unwrap();

        // Blocks the only thread of the calling runtime.
        let err = system
            .request(holder, Hold, Some(Duration::from_millis(30)))
            .wait_timeout(WAIT)
            .unwrap_err();
        assert!(matches!(err, ActorError::TimedOut(after) if after == Duration::from_millis(30)));

        system.shutdown(DrainPolicy::Graceful).unwrap();
    });
}

#[derive(Message)]
struct Nudge;

interface! {
    pub NudgeApi { Nudge }
}

/// Asks a holder with a short deadline and reports what came back.
struct Impatient {
    holder: Handle<HolderApi>,
    report: flume::Sender<ErrorKind>,
}

impl Actor for Impatient {
    type Interface = NudgeApi;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new().on(|me: &mut Impatient, ctx, _: Nudge| {
            ctx.request(me.holder, Hold)
                .timeout(Duration::from_millis(20))
                .then(|me: &mut Impatient, _ctx, result| {
                    let kind = result.map(|_| ErrorKind::Other).unwrap_or_else(|e| e.kind());
                    let _ = me.report.send(kind);
                });
            Reply::done()
        })
    }
}

#[test]
fn test_context_request_times_out() {
    let system = pooled_system(2);
    let holder = system.spawn(Holder::default()).unwrap();
    let (tx, rx) = flume::unbounded();
    let impatient = system.spawn(Impatient { holder, report: tx }).unwrap();

    system.send(impatient, Nudge).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), ErrorKind::TimedOut);

    system.shutdown(DrainPolicy::Graceful).unwrap();
}

#[derive(Message)]
#[message(result = "u32")]
struct GetEdges;

interface! {
    pub ShapeActor { GetEdges }
}

struct Circle;
struct Triangle;
struct Square;

impl Actor for Circle {
    type Interface = ShapeActor;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new().on(|_, _, _: GetEdges| Reply::Value(0))
    }
}

impl Actor for Triangle {
    type Interface = ShapeActor;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new().on(|_, _, _: GetEdges| Reply::Value(3))
    }
}

impl Actor for Square {
    type Interface = ShapeActor;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new().on(|_, _, _: GetEdges| Reply::Value(4))
    }
}

#[test]
fn test_actors_sharing_an_interface_are_interchangeable() {
    let system = pooled_system(2);
    let shapes: Vec<Handle<ShapeActor>> = vec![
        system.spawn(Circle).unwrap(),
        system.spawn(Triangle).unwrap(),
        system.spawn(Square).unwrap(),
    ];

    let edges: Vec<u32> = shapes
        .iter()
        .map(|shape| system.request(*shape, GetEdges, None).wait_timeout(WAIT).unwrap())
        .collect();
    assert_eq!(edges, vec![0, 3, 4]);

    system.shutdown(DrainPolicy::Graceful).unwrap();
}
