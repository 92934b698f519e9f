use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;

use crate::model::{DeriveField, DeriveValue, FieldKind};

impl DeriveField {
    fn name(&self) -> String {
        self.field_name.unraw().to_string()
    }

    /// The statement adding this field to `definition`.
    pub(super) fn definition(&self) -> TokenStream2 {
        let DeriveValue { tokens: field_type } = &self.field_type;

        if self.kind == FieldKind::Flatten {
            return quote! {
                definition = definition.base(<#field_type as ::schemarg::TypedArgs>::definition());
            };
        }

        let name = self.name();
        let default = match &self.default {
            Some(DeriveValue { tokens }) if self.from_str_literal => quote! {
                .default(::schemarg::ArgType::into_value(::std::convert::Into::<#field_type>::into(#tokens)))
            },
            Some(DeriveValue { tokens }) => quote! {
                .default({
                    let value: #field_type = #tokens;
                    ::schemarg::ArgType::into_value(value)
                })
            },
            None if self.optional => quote! { .default(::schemarg::Value::None) },
            None => quote! {},
        };
        let help = match &self.help {
            Some(DeriveValue { tokens }) => quote! { .help(#tokens) },
            None => quote! {},
        };
        let short = match &self.short {
            Some(DeriveValue { tokens }) => quote! { .short(#tokens) },
            None => quote! {},
        };
        let positional = if self.positional {
            quote! { .positional() }
        } else {
            quote! {}
        };
        let choices = match &self.choices {
            Some(DeriveValue { tokens }) => quote! { .choices(#tokens) },
            None => quote! {},
        };

        quote! {
            definition = definition.field(
                ::schemarg::Field::new(#name, <#field_type as ::schemarg::ArgType>::annotation())
                    #default #help #short #positional #choices
            );
            <#field_type as ::schemarg::ArgType>::register(definition.registry_mut());
        }
    }

    /// The struct-literal initializer reading this field out of `instance`.
    pub(super) fn initializer(&self) -> TokenStream2 {
        let field_name = &self.field_name;
        let DeriveValue { tokens: field_type } = &self.field_type;

        match self.kind {
            FieldKind::Flatten => quote! {
                #field_name: <#field_type as ::schemarg::TypedArgs>::from_instance(instance)?
            },
            FieldKind::Argument => {
                let name = self.name();
                quote! {
                    #field_name: instance.value::<#field_type>(#name)?
                }
            }
        }
    }

    /// The statement writing this field into `instance`.
    pub(super) fn assignment(&self) -> TokenStream2 {
        let field_name = &self.field_name;
        let DeriveValue { tokens: field_type } = &self.field_type;

        match self.kind {
            FieldKind::Flatten => quote! {
                for (name, value) in <#field_type as ::schemarg::TypedArgs>::to_instance(&self.#field_name)?.as_dict() {
                    instance.set(name, value);
                }
            },
            FieldKind::Argument => {
                let name = self.name();
                quote! {
                    instance.set(#name, ::schemarg::ArgType::into_value(::std::clone::Clone::clone(&self.#field_name)));
                }
            }
        }
    }
}
