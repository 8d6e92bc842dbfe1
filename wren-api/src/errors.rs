//! # Actor Error Types
//!
//! This module defines the error taxonomy shared by every wren component.
//! Errors raised while servicing a request travel back through that
//! request's future as a failure value, so a caller can always tell *why*
//! a request failed without parsing strings.
//!
//! ## Usage Example
//!
//! ```rust
//! use wren_api::errors::{ActorError, ErrorKind};
//!
//! fn describe(error: &ActorError) -> &'static str {
//!     match error.kind() {
//!         ErrorKind::ActorNotFound => "target is gone",
//!         ErrorKind::TimedOut => "too slow",
//!         _ => "something else",
//!     }
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::address::ActorId;

/// Core error type for the actor runtime.
#[derive(Error, Debug)]
pub enum ActorError {
    /// Send or request addressed to an actor that never existed or has
    /// already terminated.
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    /// No entry of the receiver's behavior matches the message shape.
    ///
    /// The message is dropped; the receiver keeps running.
    #[error("Actor {actor} has no behavior for message `{message}`")]
    UnexpectedMessageKind {
        actor: ActorId,
        message: &'static str,
    },

    /// A request was not answered before its deadline.
    #[error("Request timed out after {0:?}")]
    TimedOut(Duration),

    /// The promise will never be fulfilled: its owner terminated first, or
    /// every handle to it was dropped.
    #[error("Promise orphaned{}", orphan_suffix(.owner))]
    PromiseOrphaned { owner: Option<ActorId> },

    /// A promise was fulfilled a second time. This is a programming error.
    #[error("Promise already fulfilled")]
    DoubleFulfillment,

    /// New spawns and external sends are rejected while the runtime shuts down.
    #[error("Scheduler is shutting down")]
    SchedulerShuttingDown,

    /// A behavior does not handle every message of the actor's interface.
    #[error("Behavior does not cover messages: {}", .missing.join(", "))]
    IncompleteBehavior { missing: Vec<&'static str> },

    /// A response payload did not have the type the requester expected.
    #[error("Reply type mismatch: expected {expected}")]
    ReplyTypeMismatch { expected: &'static str },

    /// Domain failure reported by a handler.
    #[error("Message handling failed: {0}")]
    MessageHandlingError(String),

    /// Catch-all that keeps the original error chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Flat discriminant of [`ActorError`], convenient for assertions and
/// match arms that do not care about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ActorNotFound,
    UnexpectedMessageKind,
    TimedOut,
    PromiseOrphaned,
    DoubleFulfillment,
    SchedulerShuttingDown,
    IncompleteBehavior,
    ReplyTypeMismatch,
    MessageHandlingError,
    Other,
}

fn orphan_suffix(owner: &Option<ActorId>) -> String {
    match owner {
        Some(id) => format!(" by terminated actor {id}"),
        None => String::new(),
    }
}

impl ActorError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActorError::ActorNotFound(_) => ErrorKind::ActorNotFound,
            ActorError::UnexpectedMessageKind { .. } => ErrorKind::UnexpectedMessageKind,
            ActorError::TimedOut(_) => ErrorKind::TimedOut,
            ActorError::PromiseOrphaned { .. } => ErrorKind::PromiseOrphaned,
            ActorError::DoubleFulfillment => ErrorKind::DoubleFulfillment,
            ActorError::SchedulerShuttingDown => ErrorKind::SchedulerShuttingDown,
            ActorError::IncompleteBehavior { .. } => ErrorKind::IncompleteBehavior,
            ActorError::ReplyTypeMismatch { .. } => ErrorKind::ReplyTypeMismatch,
            ActorError::MessageHandlingError(_) => ErrorKind::MessageHandlingError,
            ActorError::Other(_) => ErrorKind::Other,
        }
    }

    /// Shorthand for a handler-reported failure.
    pub fn handling(reason: impl Into<String>) -> Self {
        ActorError::MessageHandlingError(reason.into())
    }
}
