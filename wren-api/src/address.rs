//! # Actor Addressing
//!
//! Actors are reached only through identifiers. An [`ActorId`] is a plain
//! number handed out once per process; a [`Handle`] is the same number
//! tagged at compile time with the [`Interface`](crate::interface::Interface)
//! the actor implements. Neither owns the actor, so handles can be copied
//! freely and held in cycles without keeping anything alive.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::interface::Interface;

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CORRELATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an actor.
///
/// Ids come from one process-wide counter and are never reused while the
/// process runs, even across independent actor systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(u64);

impl ActorId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        ActorId(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Token matching a response with the request that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CorrelationId(u64);

impl CorrelationId {
    pub fn next() -> Self {
        CorrelationId(NEXT_CORRELATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corr-{}", self.0)
    }
}

/// Anything that names an actor. Used by operations that do not care
/// about the message protocol, such as stop and monitor.
pub trait Addressable {
    fn actor_id(&self) -> ActorId;
}

impl Addressable for ActorId {
    fn actor_id(&self) -> ActorId {
        *self
    }
}

/// Typed, copyable reference to an actor implementing interface `I`.
///
/// The type parameter restricts which messages may be sent: the runtime's
/// `send` and `request` require `I: Accepts<M>`, so an illegal message is
/// a compile error rather than a runtime failure.
///
/// Handles are only minted by the runtime when an actor is spawned.
pub struct Handle<I: Interface> {
    id: ActorId,
    _interface: PhantomData<fn() -> I>,
}

impl<I: Interface> Handle<I> {
    #[doc(hidden)]
    pub fn from_spawned(id: ActorId) -> Self {
        Self {
            id,
            _interface: PhantomData,
        }
    }

    /// The untyped id behind this handle.
    pub fn id(&self) -> ActorId {
        self.id
    }
}

impl<I: Interface> Addressable for Handle<I> {
    fn actor_id(&self) -> ActorId {
        self.id
    }
}

impl<I: Interface> Clone for Handle<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: Interface> Copy for Handle<I> {}

impl<I: Interface> PartialEq for Handle<I> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<I: Interface> Eq for Handle<I> {}

impl<I: Interface> Hash for Handle<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<I: Interface> fmt::Debug for Handle<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("interface", &I::name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_ids_are_unique_and_increasing() {
        let a = ActorId::next();
        let b = ActorId::next();
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(format!("{}", a), format!("#{}", a.as_u64()));
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = CorrelationId::next();
        let b = CorrelationId::next();
        assert_ne!(a, b);
    }
}
