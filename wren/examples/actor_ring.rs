// Actor Ring
//
// A→B→C→D→E→F→A forms a ring. A token starts at A and every actor adds
// one to its value before passing it on. When the token has made its laps
// the holder starts a stop wave that travels around the ring once.

use std::time::Duration;

use wren::prelude::*;
use wren::Accepts;

const RING: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
const LAPS: u32 = 3;

#[derive(Debug, Message)]
struct SetNext(Handle<RingApi>);

#[derive(Debug, Message)]
struct Token {
    value: u32,
    remaining: u32,
}

#[derive(Debug, Message)]
struct Leave;

interface! {
    pub RingApi { SetNext, Token, Leave }
}

struct RingActor {
    name: &'static str,
    next: Option<Handle<RingApi>>,
}

impl RingActor {
    fn pass<M>(&self, ctx: &Context<Self>, msg: M)
    where
        M: Message,
        RingApi: Accepts<M>,
    {
        if let Some(next) = self.next {
            // The ring shrinks during the stop wave.
            if let Err(err) = ctx.send(next, msg) {
                println!("{}: next actor is gone ({})", self.name, err);
            }
        }
    }
}

impl Actor for RingActor {
    type Interface = RingApi;

    fn name(&self) -> &str {
        self.name
    }

    fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
        Behavior::new()
            .on(|ring: &mut RingActor, _ctx, SetNext(next): SetNext| {
                ring.next = Some(next);
                Reply::done()
            })
            .on(|ring: &mut RingActor, ctx, token: Token| {
                if token.remaining == 0 {
                    println!("{}: token finished with value {}", ring.name, token.value);
                    ring.pass(ctx, Leave);
                    ctx.stop();
                } else {
                    ring.pass(
                        ctx,
                        Token {
                            value: token.value + 1,
                            remaining: token.remaining - 1,
                        },
                    );
                }
                Reply::done()
            })
            .on(|ring: &mut RingActor, ctx, _: Leave| {
                ring.pass(ctx, Leave);
                ctx.stop();
                Reply::done()
            })
    }

    fn on_exit(&mut self, reason: &ExitReason, _ctx: &mut Context<Self>) {
        println!("{}: exiting ({})", self.name, reason);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    wren::logging::init_default();

    let system = ActorSystem::new(SystemConfig::default().with_name("ring").with_pool_size(3))?;

    let mut members = Vec::with_capacity(RING.len());
    for name in RING {
        members.push(system.spawn(RingActor { name, next: None })?);
    }
    for (i, member) in members.iter().enumerate() {
        let next = members[(i + 1) % members.len()];
        system.send(*member, SetNext(next))?;
    }

    let exits: Vec<_> = members.iter().map(|member| system.exit_future(member)).collect();
    system.send(
        members[0],
        Token {
            value: 0,
            remaining: LAPS * RING.len() as u32,
        },
    )?;

    for exit in exits {
        exit.wait_timeout(Duration::from_secs(5))?;
    }
    println!("ring stopped, {} actors left", system.live_actors());

    system.shutdown(DrainPolicy::Graceful)?;
    Ok(())
}
