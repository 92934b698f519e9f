use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

use crate::model::{DeriveArgs, DeriveValue, FieldKind};

impl TryFrom<DeriveArgs> for TokenStream2 {
    type Error = syn::Error;

    fn try_from(value: DeriveArgs) -> Result<Self, Self::Error> {
        let DeriveArgs {
            struct_name,
            program,
            description,
            explicit_bool,
            underscores_to_dashes,
            mut fields,
        } = value;
        let program = match program {
            Some(DeriveValue { tokens }) => tokens,
            None => quote! { env!("CARGO_CRATE_NAME") },
        };
        let description = match description {
            Some(DeriveValue { tokens }) => quote! { .description(#tokens) },
            None => quote! {},
        };
        let explicit_bool = if explicit_bool {
            quote! { .explicit_bool(true) }
        } else {
            quote! {}
        };
        let underscores_to_dashes = if underscores_to_dashes {
            quote! { .underscores_to_dashes(true) }
        } else {
            quote! {}
        };

        // Flattened bases compose ahead of the struct's own fields.
        fields.sort_by_key(|f| f.kind != FieldKind::Flatten);
        let definitions: Vec<TokenStream2> = fields.iter().map(|f| f.definition()).collect();
        let assignments: Vec<TokenStream2> = fields.iter().map(|f| f.assignment()).collect();
        let initializers: Vec<TokenStream2> = fields.iter().map(|f| f.initializer()).collect();

        Ok(quote! {
            impl ::schemarg::TypedArgs for #struct_name {
                fn definition() -> ::schemarg::Definition {
                    #[allow(unused_mut)]
                    let mut definition = ::schemarg::Definition::new(#program)
                        #description #explicit_bool #underscores_to_dashes;
                    #( #definitions )*
                    definition
                }

                fn from_instance(instance: &::schemarg::Instance) -> ::std::result::Result<Self, ::schemarg::Error> {
                    Ok(Self {
                        #( #initializers ),*
                    })
                }

                fn to_instance(&self) -> ::std::result::Result<::schemarg::Instance, ::schemarg::Error> {
                    let schema = ::schemarg::introspect(
                        &<Self as ::schemarg::TypedArgs>::definition(),
                        &::schemarg::NoDocs,
                    )?;
                    #[allow(unused_mut)]
                    let mut instance = ::schemarg::Instance::new(&schema);
                    #( #assignments )*
                    Ok(instance)
                }
            }
        })
    }
}
