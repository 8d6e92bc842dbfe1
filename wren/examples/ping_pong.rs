use std::time::Duration;

use wren::prelude::*;

// Define messages
#[derive(Debug, Message)]
#[message(result = "u32")]
struct Ping(u32);

#[derive(Debug, Message)]
#[message(result = "u32")]
struct Rally(u32);

interface! {
    pub PongApi { Ping }
}

interface! {
    pub PingApi { Rally }
}

/// Answers every ping with the next number.
struct PongActor {
    count: u32,
}

impl Actor for PongActor {
    type Interface = PongApi;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new().on(|pong: &mut PongActor, _ctx, Ping(n): Ping| {
            pong.count += 1;
            println!("PongActor received Ping({})", n);
            Reply::Value(n + 1)
        })
    }
}

/// Plays `Rally(n)` rounds against the pong actor, then answers the
/// original request with the last number seen.
struct PingActor {
    pong: Handle<PongApi>,
}

impl PingActor {
    fn volley(ctx: &mut Context<Self>, pong: Handle<PongApi>, value: u32, left: u32, done: ResponsePromise<u32>) {
        ctx.request(pong, Ping(value))
            .timeout(Duration::from_secs(1))
            .then(move |_, ctx, result| match result {
                Ok(next) if left > 1 => PingActor::volley(ctx, pong, next, left - 1, done),
                Ok(next) => {
                    let _ = done.deliver(next);
                }
                Err(err) => {
                    let _ = done.fail(err);
                }
            });
    }
}

impl Actor for PingActor {
    type Interface = PingApi;

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new().on(|ping: &mut PingActor, ctx, Rally(rounds): Rally| {
            let done = ctx.make_response_promise();
            if rounds == 0 {
                let _ = done.deliver(0);
            } else {
                PingActor::volley(ctx, ping.pong, 0, rounds, done.clone());
            }
            Reply::Deferred(done)
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    wren::logging::init_default();

    let system = ActorSystem::new(SystemConfig::default().with_name("ping-pong").with_pool_size(2))?;

    let pong = system.spawn(PongActor { count: 0 })?;
    let ping = system.spawn(PingActor { pong })?;

    let last = system
        .request(ping, Rally(5), Some(Duration::from_secs(5)))
        .wait()?;
    println!("Rally finished at {}", last);

    system.shutdown(DrainPolicy::Graceful)?;
    Ok(())
}
