//! Derive macros for `wren-api`.

use proc_macro::TokenStream;

mod common;
mod message;

/// Derives `wren_api::Message`.
///
/// The response type defaults to `()` and the reported name to the type's
/// identifier. Both can be set with the `message` attribute:
///
/// ```rust
/// # use wren_api::Message;
/// #[derive(Message)]
/// #[message(result = "Option<String>")]
/// struct Lookup {
///     key: String,
/// }
///
/// #[derive(Message)]
/// #[message(result = "u32", name = "get_edges")]
/// struct GetEdges;
///
/// assert_eq!(<GetEdges as Message>::name(), "get_edges");
/// ```
///
/// Works for structs and enums; unions are rejected.
#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    message::derive_message_impl(input)
}
