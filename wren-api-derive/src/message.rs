use darling::{FromAttributes, FromMeta};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_str, Attribute, DeriveInput, Type};

use crate::common::{format_error_span, to_compile_error};

/// Message attribute options
#[derive(Debug, Default, FromMeta)]
pub struct MessageOptions {
    /// Response type, parsed as a Rust type. Defaults to `()`.
    #[darling(default)]
    result: Option<String>,
    /// Name reported in logs and errors. Defaults to the type's identifier.
    #[darling(default)]
    name: Option<String>,
}

#[derive(Debug, FromAttributes)]
#[darling(attributes(message))]
pub struct MessageArgs {
    #[darling(flatten)]
    opts: MessageOptions,
}

/// Parse `#[message(...)]` attributes, reporting malformed ones.
pub fn parse_message_attrs(attrs: &[Attribute]) -> darling::Result<MessageOptions> {
    MessageArgs::from_attributes(attrs).map(|a| a.opts)
}

pub fn derive_message_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if let syn::Data::Union(_) = input.data {
        return format_error_span(&input.ident, "Message cannot be derived for unions").into();
    }

    let options = match parse_message_attrs(&input.attrs) {
        Ok(options) => options,
        Err(err) => return err.write_errors().into(),
    };

    let ident = &input.ident;

    let result_type: Type = match options.result.as_deref() {
        Some(text) => match parse_str::<Type>(text) {
            Ok(ty) => ty,
            Err(err) => {
                return to_compile_error(syn::Error::new_spanned(
                    ident,
                    format!("invalid `result` type `{}`: {}", text, err),
                ))
            }
        },
        None => syn::parse_quote!(()),
    };

    let name = options.name.unwrap_or_else(|| ident.to_string());

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::wren_api::Message for #ident #ty_generics #where_clause {
            type Result = #result_type;

            fn name() -> &'static str {
                #name
            }
        }
    };

    TokenStream::from(expanded)
}
