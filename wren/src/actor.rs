//! # Actor Trait
//!
//! An actor is a value that owns its state and answers messages through a
//! [`Behavior`]. The runtime calls [`Actor::make_behavior`] once at spawn
//! time; the returned table must handle every message of the actor's
//! interface.
//!
//! ## Lifecycle Hooks
//!
//! - [`Actor::make_behavior`]: runs on the spawning thread before the
//!   handle is returned; may already send messages
//! - [`Actor::on_down`]: a monitored actor terminated
//! - [`Actor::on_exit`]: finalizer, runs once the mailbox has been drained
//!   and outstanding promises were orphaned
//!
//! ## Usage Example
//!
//! ```rust
//! use wren::prelude::*;
//!
//! #[derive(Message)]
//! #[message(result = "String")]
//! struct Reverse(String);
//!
//! interface! { pub Reverser { Reverse } }
//!
//! struct Mirror;
//!
//! impl Actor for Mirror {
//!     type Interface = Reverser;
//!
//!     fn make_behavior(&mut self, _ctx: &mut Context<Self>) -> Behavior<Self> {
//!         Behavior::new().on(|_, _, Reverse(text): Reverse| {
//!             Reply::Value(text.chars().rev().collect())
//!         })
//!     }
//! }
//! ```

use wren_api::interface::Interface;
use wren_api::{DownNotification, ExitReason};

use crate::behavior::Behavior;
use crate::context::Context;

/// Core Actor trait
pub trait Actor: Send + Sized + 'static {
    /// Messages this actor accepts through its handle.
    type Interface: Interface;

    /// Builds the initial behavior.
    fn make_behavior(&mut self, ctx: &mut Context<Self>) -> Behavior<Self>;

    /// Handles the termination of a monitored actor.
    fn on_down(&mut self, _down: DownNotification, _ctx: &mut Context<Self>) {}

    /// Finalizer. The mailbox is already closed: messages sent here reach
    /// other actors, but responses to this actor are lost.
    fn on_exit(&mut self, _reason: &ExitReason, _ctx: &mut Context<Self>) {}

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
