//! # Actor Message System
//!
//! Messages are ordinary Rust values. Each message type names the type of
//! its response through [`Message::Result`], so a request is typed end to
//! end: the caller gets back exactly what the handler produced.
//!
//! At runtime a message is identified by its [`Shape`], a `TypeId` paired
//! with a readable name. Behaviors dispatch on shapes, and interfaces are
//! sets of shapes.
//!
//! ## Usage Example
//!
//! ```rust
//! use wren_api::Message;
//!
//! #[derive(Message)]
//! #[message(result = "String")]
//! struct Reverse(String);
//!
//! assert_eq!(<Reverse as Message>::name(), "Reverse");
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Core trait for defining actor messages.
///
/// Usually derived with `#[derive(Message)]`. Implement it by hand when
/// the derive's attribute syntax is not enough:
///
/// ```rust
/// use wren_api::Message;
///
/// struct Add(i32, i32);
///
/// impl Message for Add {
///     type Result = i32;
/// }
/// ```
pub trait Message: Send + 'static {
    /// Type produced by the handler and delivered to the requester.
    type Result: Send + 'static;

    /// Human-readable name used in logs and errors.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runtime tag of a message type.
///
/// Equality and hashing only look at the `TypeId`; the name is carried
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct Shape {
    id: TypeId,
    name: &'static str,
}

impl Shape {
    pub fn of<M: Message>() -> Self {
        Shape {
            id: TypeId::of::<M>(),
            name: M::name(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({})", self.name)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
