//! # Typed Actor Interfaces
//!
//! An interface is a zero-sized marker type listing the messages an actor
//! accepts. [`Handle<I>`](crate::address::Handle) carries the marker, and
//! the runtime only lets you send `M` through it when `I: Accepts<M>`.
//! Several actor types can implement the same interface, and their handles
//! are then interchangeable.
//!
//! Interfaces are declared with the [`interface!`](crate::interface!) macro:
//!
//! ```rust
//! use wren_api::{interface, Message};
//!
//! #[derive(Message)]
//! #[message(result = "u32")]
//! struct GetEdges;
//!
//! interface! {
//!     /// Anything with edges.
//!     pub ShapeActor { GetEdges }
//! }
//!
//! use wren_api::interface::Interface;
//! assert_eq!(ShapeActor::shapes().len(), 1);
//! ```

use crate::message::{Message, Shape};

/// Compile-time set of message shapes.
pub trait Interface: 'static {
    /// Interface name, for logs.
    fn name() -> &'static str;

    /// Every shape the interface accepts, in declaration order.
    fn shapes() -> Vec<Shape>;
}

/// Marks `M` as legal to send through a `Handle<Self>`.
pub trait Accepts<M: Message>: Interface {}

/// Declares an interface marker together with its [`Interface`] and
/// [`Accepts`] implementations.
#[macro_export]
macro_rules! interface {
    ($(#[$meta:meta])* $vis:vis $name:ident { $($msg:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {}

        impl $crate::interface::Interface for $name {
            fn name() -> &'static str {
                stringify!($name)
            }

            fn shapes() -> ::std::vec::Vec<$crate::message::Shape> {
                ::std::vec![$($crate::message::Shape::of::<$msg>()),*]
            }
        }

        $(impl $crate::interface::Accepts<$msg> for $name {})*
    };
}
