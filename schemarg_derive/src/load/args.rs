use super::attribute::doc_comment;
use crate::model::{DeriveArgs, DeriveField, IntermediateAttributes};
use crate::MACRO_TYPED_ARGS;

impl TryFrom<syn::DeriveInput> for DeriveArgs {
    type Error = syn::Error;

    fn try_from(value: syn::DeriveInput) -> Result<Self, Self::Error> {
        let attributes = IntermediateAttributes::try_from(value.attrs.as_slice())?;
        let struct_name = value.ident.clone();

        for singleton in &attributes.singletons {
            if !["explicit_bool", "underscores_to_dashes"].contains(&singleton.as_str()) {
                return Err(syn::Error::new(
                    struct_name.span(),
                    format!("Invalid - unknown struct attribute `{singleton}`."),
                ));
            }
        }

        for pair in attributes.pairs.keys() {
            if !["program", "description"].contains(&pair.as_str()) {
                return Err(syn::Error::new(
                    struct_name.span(),
                    format!("Invalid - unknown struct attribute `{pair} = ..`."),
                ));
            }
        }

        let fields = match &value.data {
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Named(fields),
                ..
            }) => fields
                .named
                .iter()
                .map(DeriveField::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Unit,
                ..
            }) => Vec::default(),
            _ => {
                return Err(syn::Error::new(
                    struct_name.span(),
                    format!("Invalid - {MACRO_TYPED_ARGS} only applies to structs with named fields."),
                ));
            }
        };

        Ok(DeriveArgs {
            struct_name,
            program: attributes.last("program"),
            description: attributes
                .last("description")
                .or_else(|| doc_comment(&value.attrs)),
            explicit_bool: attributes.singletons.contains("explicit_bool"),
            underscores_to_dashes: attributes.singletons.contains("underscores_to_dashes"),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeriveValue, FieldKind};
    use proc_macro2::{Literal, Span};
    use quote::{quote, ToTokens};

    fn ident(name: &str) -> syn::Ident {
        syn::Ident::new(name, Span::call_site())
    }

    #[test]
    fn construct_derive_args_empty() {
        // Setup
        let input: syn::DeriveInput = syn::parse_str(
            r#"
                #[derive(TypedArgs)]
                struct Parameters { }
            "#,
        )
        .unwrap();

        // Execute
        let derive_args = DeriveArgs::try_from(input).unwrap();

        // Verify
        assert_eq!(
            derive_args,
            DeriveArgs {
                struct_name: ident("Parameters"),
                program: None,
                description: None,
                explicit_bool: false,
                underscores_to_dashes: false,
                fields: vec![],
            }
        );
    }

    #[test]
    fn construct_derive_args() {
        // Setup
        let input: syn::DeriveInput = syn::parse_str(
            r#"
                /// Adds numbers.
                #[derive(TypedArgs)]
                #[schemarg(program = "summer", explicit_bool, underscores_to_dashes)]
                struct Parameters {
                    #[schemarg(flatten)]
                    common: Common,
                    items: Vec<u32>,
                }
            "#,
        )
        .unwrap();

        // Execute
        let derive_args = DeriveArgs::try_from(input).unwrap();

        // Verify
        assert_eq!(derive_args.struct_name, ident("Parameters"));
        assert_eq!(
            derive_args.program,
            Some(DeriveValue {
                tokens: Literal::string("summer").into_token_stream(),
            })
        );
        assert_eq!(
            derive_args.description,
            Some(DeriveValue {
                tokens: Literal::string("Adds numbers.").into_token_stream(),
            })
        );
        assert!(derive_args.explicit_bool);
        assert!(derive_args.underscores_to_dashes);
        assert_eq!(derive_args.fields.len(), 2);
        assert_eq!(derive_args.fields[0].kind, FieldKind::Flatten);
        assert_eq!(
            derive_args.fields[1].field_type,
            DeriveValue {
                tokens: quote! { Vec<u32> },
            }
        );
    }

    #[test]
    fn construct_derive_args_description_over_doc() {
        // Setup
        let input: syn::DeriveInput = syn::parse_str(
            r#"
                /// Ignored.
                #[schemarg(description = "Explicit.")]
                struct Parameters { }
            "#,
        )
        .unwrap();

        // Execute
        let derive_args = DeriveArgs::try_from(input).unwrap();

        // Verify
        assert_eq!(
            derive_args.description,
            Some(DeriveValue {
                tokens: Literal::string("Explicit.").into_token_stream(),
            })
        );
    }

    #[test]
    fn construct_derive_args_invalid() {
        for text in [
            "enum Values { A, B }",
            "struct Parameters(u32);",
            "#[schemarg(unknown)] struct Parameters { }",
            "#[schemarg(unknown = 1)] struct Parameters { }",
        ] {
            let input: syn::DeriveInput = syn::parse_str(text).unwrap();
            assert!(DeriveArgs::try_from(input).is_err(), "{text}");
        }
    }
}
