use crate::model::{DeriveValue, IntermediateAttributes};
use crate::ATTRIBUTE;
use quote::ToTokens;

impl TryFrom<&[syn::Attribute]> for IntermediateAttributes {
    type Error = syn::Error;

    /// Gather every `#[schemarg(..)]` attribute; repeated pairs accumulate in order.
    fn try_from(value: &[syn::Attribute]) -> Result<Self, Self::Error> {
        let mut attributes = IntermediateAttributes::default();

        for attribute in value.iter().filter(|a| a.path().is_ident(ATTRIBUTE)) {
            let attributes_parser =
                syn::punctuated::Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated;

            for expression in attribute.parse_args_with(attributes_parser)? {
                match expression {
                    syn::Expr::Assign(assignment) => {
                        let left = assignment.left.to_token_stream();
                        let values = attributes.pairs.entry(left.to_string()).or_default();
                        values.push(DeriveValue {
                            tokens: assignment.right.to_token_stream(),
                        });
                    }
                    syn::Expr::Path(path) if path.path.get_ident().is_some() => {
                        let ident = path.path.to_token_stream();
                        attributes.singletons.insert(ident.to_string());
                    }
                    other => {
                        return Err(syn::Error::new_spanned(
                            &other,
                            format!("Invalid - unparseable attribute `{}`.", other.to_token_stream()),
                        ));
                    }
                }
            }
        }

        Ok(attributes)
    }
}

impl IntermediateAttributes {
    /// The last value of the pair `name`.
    pub(crate) fn last(&self, name: &str) -> Option<DeriveValue> {
        self.pairs.get(name).and_then(|values| values.last()).cloned()
    }
}

/// The `///` doc comment lines of an item, joined into one string literal.
pub(crate) fn doc_comment(attributes: &[syn::Attribute]) -> Option<DeriveValue> {
    let lines: Vec<String> = attributes
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(text),
                        ..
                    }),
                ..
            }) => Some(text.value().trim().to_string()),
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        let text = lines.join(" ");
        Some(DeriveValue {
            tokens: quote::quote! { #text },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proc_macro2::Literal;
    use std::collections::{HashMap, HashSet};
    use syn::parse_quote;

    #[test]
    fn construct_intermediate_attributes_empty() {
        // Setup
        let attributes: Vec<syn::Attribute> = vec![parse_quote! {
            #[schemarg()]
        }];

        // Execute
        let intermediate = IntermediateAttributes::try_from(attributes.as_slice()).unwrap();

        // Verify
        assert_eq!(
            intermediate,
            IntermediateAttributes {
                singletons: HashSet::default(),
                pairs: HashMap::default()
            }
        );
    }

    #[test]
    fn construct_intermediate_attributes() {
        // Setup
        let attributes: Vec<syn::Attribute> = vec![
            parse_quote! {
                #[schemarg(abc, qwerty = "123")]
            },
            parse_quote! {
                #[other(ignored)]
            },
            parse_quote! {
                #[schemarg(qwerty = "456")]
            },
        ];

        // Execute
        let intermediate = IntermediateAttributes::try_from(attributes.as_slice()).unwrap();

        // Verify
        assert_eq!(
            intermediate,
            IntermediateAttributes {
                singletons: HashSet::from(["abc".to_string()]),
                pairs: HashMap::from([(
                    "qwerty".to_string(),
                    vec![
                        DeriveValue {
                            tokens: Literal::string("123").into_token_stream(),
                        },
                        DeriveValue {
                            tokens: Literal::string("456").into_token_stream(),
                        }
                    ]
                )])
            }
        );
        assert_eq!(
            intermediate.last("qwerty"),
            Some(DeriveValue {
                tokens: Literal::string("456").into_token_stream(),
            })
        );
    }

    #[test]
    fn construct_intermediate_attributes_invalid() {
        // Setup
        let bare: Vec<syn::Attribute> = vec![parse_quote! {
            #[schemarg]
        }];
        let expression: Vec<syn::Attribute> = vec![parse_quote! {
            #[schemarg(a + b)]
        }];

        // Execute & verify
        assert!(IntermediateAttributes::try_from(bare.as_slice()).is_err());
        assert!(IntermediateAttributes::try_from(expression.as_slice()).is_err());
    }

    #[test]
    fn doc_comment_lines() {
        // Setup
        let attributes: Vec<syn::Attribute> = vec![
            parse_quote! { #[doc = " The first line."] },
            parse_quote! { #[doc = ""] },
            parse_quote! { #[doc = " The second line."] },
        ];

        // Execute
        let doc = doc_comment(&attributes);

        // Verify
        assert_eq!(
            doc,
            Some(DeriveValue {
                tokens: Literal::string("The first line. The second line.").into_token_stream(),
            })
        );
        assert_eq!(doc_comment(&[]), None);
    }
}
