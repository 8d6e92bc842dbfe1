//! # wren Actor API
//!
//! Runtime-independent vocabulary for the wren typed actor runtime. The
//! runtime crate (`wren`) builds on these types; applications use them to
//! declare messages and interfaces without depending on scheduling details.
//!
//! ## Core Components
//!
//! - **Messages**: plain Rust values implementing [`Message`], each naming
//!   its response type
//! - **Interfaces**: compile-time sets of messages, declared with
//!   [`interface!`], that type actor handles
//! - **Addresses**: [`ActorId`] and the typed, copyable [`Handle`]
//! - **Lifecycle**: [`ActorState`], [`ExitReason`] and [`DownNotification`]
//! - **Errors**: [`ActorError`] with its flat [`ErrorKind`]
//!
//! ## Usage Example
//!
//! ```rust
//! use wren_api::{interface, Message};
//!
//! #[derive(Message)]
//! #[message(result = "String")]
//! struct Greet(String);
//!
//! interface! {
//!     pub Greeter { Greet }
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`actor`]: lifecycle states and exit reasons
//! - [`address`]: actor ids, correlation ids and typed handles
//! - [`errors`]: error taxonomy
//! - [`interface`]: interface traits and the declaration macro
//! - [`message`]: the message trait and runtime shapes
//! - [`supervisor`]: down notifications
//! - [`types`]: common type aliases

extern crate self as wren_api;

pub mod actor;
pub mod address;
pub mod errors;
pub mod interface;
pub mod message;
pub mod supervisor;
pub mod types;

pub use actor::{ActorState, ExitReason};
pub use address::{ActorId, Addressable, CorrelationId, Handle};
pub use errors::{ActorError, ErrorKind};
pub use interface::{Accepts, Interface};
pub use message::{Message, Shape};
pub use supervisor::DownNotification;
pub use types::{ActorResult, BoxedMessage};

// Re-export the derive macro
pub use wren_api_derive::Message;
