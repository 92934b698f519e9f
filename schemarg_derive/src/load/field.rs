use super::attribute::doc_comment;
use super::incompatible_error;
use crate::model::{DeriveField, DeriveValue, FieldKind, IntermediateAttributes};
use quote::ToTokens;

const SINGLETONS: [&str; 2] = ["positional", "flatten"];
const PAIRS: [&str; 4] = ["default", "help", "short", "choices"];

impl TryFrom<&syn::Field> for DeriveField {
    type Error = syn::Error;

    fn try_from(value: &syn::Field) -> Result<Self, Self::Error> {
        let field_name = value.ident.clone().ok_or_else(|| {
            syn::Error::new_spanned(value, "Invalid - only named fields are supported.")
        })?;
        let attributes = IntermediateAttributes::try_from(value.attrs.as_slice())?;

        for singleton in &attributes.singletons {
            if !SINGLETONS.contains(&singleton.as_str()) {
                return Err(syn::Error::new(
                    field_name.span(),
                    format!("Invalid - unknown field attribute `{singleton}`."),
                ));
            }
        }

        for pair in attributes.pairs.keys() {
            if !PAIRS.contains(&pair.as_str()) {
                return Err(syn::Error::new(
                    field_name.span(),
                    format!("Invalid - unknown field attribute `{pair} = ..`."),
                ));
            }
        }

        let positional = attributes.singletons.contains("positional");
        let flatten = attributes.singletons.contains("flatten");
        let default = attributes.last("default");
        let short = attributes.last("short");
        let choices = attributes.last("choices");
        let help = attributes.last("help").or_else(|| doc_comment(&value.attrs));

        if flatten {
            for (present, attribute) in [
                (positional, "#[schemarg(positional)]"),
                (default.is_some(), "#[schemarg(default = ..)]"),
                (short.is_some(), "#[schemarg(short = ..)]"),
                (choices.is_some(), "#[schemarg(choices = ..)]"),
            ] {
                if present {
                    return Err(incompatible_error(
                        &field_name,
                        "#[schemarg(flatten)]",
                        attribute,
                    ));
                }
            }
        }

        if positional && short.is_some() {
            return Err(incompatible_error(
                &field_name,
                "#[schemarg(positional)]",
                "#[schemarg(short = ..)]",
            ));
        }

        let type_ident = match &value.ty {
            syn::Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        };

        Ok(DeriveField {
            field_name,
            field_type: DeriveValue {
                tokens: value.ty.to_token_stream(),
            },
            kind: if flatten {
                FieldKind::Flatten
            } else {
                FieldKind::Argument
            },
            default,
            help: if flatten { None } else { help },
            short,
            positional,
            choices,
            optional: type_ident.as_deref() == Some("Option"),
            from_str_literal: matches!(type_ident.as_deref(), Some("String" | "PathBuf")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proc_macro2::{Literal, Span};
    use quote::quote;
    use syn::parse_quote;

    fn ident(name: &str) -> syn::Ident {
        syn::Ident::new(name, Span::call_site())
    }

    #[test]
    fn construct_derive_field_plain() {
        // Setup
        let field: syn::Field = parse_quote! {
            count: u32
        };

        // Execute
        let derive_field = DeriveField::try_from(&field).unwrap();

        // Verify
        assert_eq!(
            derive_field,
            DeriveField {
                field_name: ident("count"),
                field_type: DeriveValue {
                    tokens: quote! { u32 },
                },
                kind: FieldKind::Argument,
                default: None,
                help: None,
                short: None,
                positional: false,
                choices: None,
                optional: false,
                from_str_literal: false,
            }
        );
    }

    #[test]
    fn construct_derive_field_attributes() {
        // Setup
        let field: syn::Field = parse_quote! {
            /// Where to go.
            #[schemarg(default = "home", short = 'd', choices = ["home", "work"])]
            destination: String
        };

        // Execute
        let derive_field = DeriveField::try_from(&field).unwrap();

        // Verify
        assert_eq!(
            derive_field,
            DeriveField {
                field_name: ident("destination"),
                field_type: DeriveValue {
                    tokens: quote! { String },
                },
                kind: FieldKind::Argument,
                default: Some(DeriveValue {
                    tokens: Literal::string("home").into_token_stream(),
                }),
                help: Some(DeriveValue {
                    tokens: Literal::string("Where to go.").into_token_stream(),
                }),
                short: Some(DeriveValue {
                    tokens: Literal::character('d').into_token_stream(),
                }),
                positional: false,
                choices: Some(DeriveValue {
                    tokens: quote! { ["home", "work"] },
                }),
                optional: false,
                from_str_literal: true,
            }
        );
    }

    #[test]
    fn construct_derive_field_help_over_doc() {
        // Setup
        let field: syn::Field = parse_quote! {
            /// Ignored.
            #[schemarg(help = "Explicit.")]
            maybe: Option<std::path::PathBuf>
        };

        // Execute
        let derive_field = DeriveField::try_from(&field).unwrap();

        // Verify
        assert_eq!(
            derive_field.help,
            Some(DeriveValue {
                tokens: Literal::string("Explicit.").into_token_stream(),
            })
        );
        assert!(derive_field.optional);
        assert!(!derive_field.from_str_literal);
    }

    #[test]
    fn construct_derive_field_flatten() {
        // Setup
        let field: syn::Field = parse_quote! {
            #[schemarg(flatten)]
            common: Common
        };

        // Execute
        let derive_field = DeriveField::try_from(&field).unwrap();

        // Verify
        assert_eq!(derive_field.kind, FieldKind::Flatten);
    }

    #[test]
    fn construct_derive_field_invalid() {
        let cases: Vec<syn::Field> = vec![
            parse_quote! {
                #[schemarg(flatten, default = 1)]
                common: Common
            },
            parse_quote! {
                #[schemarg(positional, short = 'p')]
                path: String
            },
            parse_quote! {
                #[schemarg(unknown)]
                path: String
            },
            parse_quote! {
                #[schemarg(unknown = 1)]
                path: String
            },
        ];

        for field in cases {
            assert!(DeriveField::try_from(&field).is_err());
        }
    }
}
