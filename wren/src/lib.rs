// wren Actor Runtime
//
// A typed actor runtime: actors own their state, talk through typed
// handles, answer requests through promises, watch each other with
// monitors and are stopped by an explicit, draining shutdown.
//
// Vocabulary types (messages, interfaces, ids, errors) live in `wren-api`
// and are re-exported here; this crate adds scheduling, mailboxes,
// contexts and the system itself.

pub mod actor;
pub mod behavior;
mod cell;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod logging;
mod mailbox;
mod processor;
pub mod promise;
mod reply;
mod scheduler;
mod supervision;
mod sync;
pub mod system;
mod timer;

// Re-export commonly used types
pub use actor::Actor;
pub use behavior::{Behavior, Reply};
pub use config::{DrainPolicy, SchedulingMode, SystemConfig};
pub use context::{Context, RequestBuilder};
pub use diagnostics::Diagnostic;
pub use envelope::PayloadTag;
pub use error::{ActorError, ErrorKind, SpawnError, SystemError};
pub use promise::{channel, Promise, ResponseFuture, ResponsePromise};
pub use system::{ActorSystem, SystemStatus};

pub use wren_api::{
    interface, Accepts, ActorId, ActorResult, ActorState, Addressable, CorrelationId,
    DownNotification, ExitReason, Handle, Interface, Message, Shape,
};

/// Everything needed to write and run actors.
pub mod prelude {
    pub use crate::{
        interface, Actor, ActorError, ActorId, ActorState, ActorSystem, Addressable, Behavior,
        Context, DownNotification, DrainPolicy, ErrorKind, ExitReason, Handle, Message, Reply,
        RequestBuilder, ResponseFuture, ResponsePromise, SchedulingMode, SpawnError, SystemConfig,
    };
}
