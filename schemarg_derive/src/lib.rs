//! Derive macro for `schemarg`.
//! See [documentation root](https://docs.rs/schemarg/latest/schemarg/index.html) for full details.
extern crate proc_macro;

mod generate;
mod load;
mod model;

use crate::model::DeriveArgs;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;

pub(crate) const ATTRIBUTE: &str = "schemarg";
pub(crate) const MACRO_TYPED_ARGS: &str = "#[derive(TypedArgs)]";

/// Implement `schemarg::TypedArgs` for a struct with named fields.
///
/// Struct attributes: `#[schemarg(program = "..", description = "..", explicit_bool, underscores_to_dashes)]`.
/// The struct's `///` doc comment is the description when none is given.
///
/// Field attributes: `#[schemarg(default = .., help = "..", short = 'c', choices = [..], positional, flatten)]`.
/// A field's `///` doc comment is its help when none is given.
#[proc_macro_derive(TypedArgs, attributes(schemarg))]
pub fn typed_args(input: TokenStream) -> TokenStream {
    let derive_input = syn::parse_macro_input!(input as syn::DeriveInput);

    DeriveArgs::try_from(derive_input)
        .and_then(TokenStream2::try_from)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
