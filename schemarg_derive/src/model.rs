use proc_macro2::TokenStream as TokenStream2;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct DeriveValue {
    pub tokens: TokenStream2,
}

impl PartialEq for DeriveValue {
    fn eq(&self, other: &Self) -> bool {
        let st = &self.tokens.to_string();
        let ot = &other.tokens.to_string();
        st == ot
    }
}

impl Eq for DeriveValue {}

/// The `#[schemarg(..)]` attributes of one item, before interpretation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IntermediateAttributes {
    pub singletons: HashSet<String>,
    pub pairs: HashMap<String, Vec<DeriveValue>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Argument,
    // The field holds another `TypedArgs` struct whose fields compose ahead of ours.
    Flatten,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveField {
    pub field_name: syn::Ident,
    pub field_type: DeriveValue,
    pub kind: FieldKind,
    pub default: Option<DeriveValue>,
    pub help: Option<DeriveValue>,
    pub short: Option<DeriveValue>,
    pub positional: bool,
    pub choices: Option<DeriveValue>,
    // `Option<..>`, absent by default.
    pub optional: bool,
    // `String`/`PathBuf`, whose defaults are converted from string literals.
    pub from_str_literal: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveArgs {
    pub struct_name: syn::Ident,
    pub program: Option<DeriveValue>,
    pub description: Option<DeriveValue>,
    pub explicit_bool: bool,
    pub underscores_to_dashes: bool,
    pub fields: Vec<DeriveField>,
}
