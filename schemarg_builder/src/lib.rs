//! Builder module for `schemarg`.
//! See [documentation root](https://docs.rs/schemarg/latest/schemarg/index.html) for full details.
#![deny(missing_docs)]
mod argtype;
mod constant;
mod error;
mod grammar;
mod invoke;
mod matcher;
mod materialize;
mod merge;
mod model;
mod parser;
mod reproducibility;
mod schema;
mod serialize;
mod types;
mod value;

pub use argtype::*;
pub use error::*;
pub use grammar::Grammar;
pub use invoke::*;
pub use materialize::*;
pub use merge::{layer_defaults, resolve_tokens};
pub use model::*;
pub use reproducibility::Reproducibility;
pub use schema::*;
pub use serialize::{LoadOptions, SaveOptions, Trust};
pub use types::*;
pub use value::*;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
